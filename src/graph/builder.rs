//! Graph builder: infers the processor DAG from declared attribute names and types.
//!
//! # Algorithm
//!
//! A single forward pass over the processors in configuration order. Every
//! processor is wired only to nodes built before it, which is what makes the
//! result acyclic by construction:
//!
//! 1. Resolve the input names ([`attributes::resolve_inputs`]).
//! 2. Whole-store inputs depend on the producers named by the processor's
//!    [`CustomDependencies`](crate::traits::CustomDependencies), or, lacking that
//!    capability, on every node that has produced an output so far.
//! 3. Typed inputs depend on their current producer. A missing producer is an error
//!    unless the field has a default; an incompatible producer type is an error.
//! 4. A node without requirements is a root.
//! 5. Outputs are registered under their resolved names. Name collisions are
//!    resolved by renaming whichever side is renamable, or reported.
//! 6. In-place inputs make this node the producer of that name from now on.
//!
//! Errors are collected over the whole configuration rather than failing on the
//! first bad processor.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use super::attributes::{resolve_inputs, resolve_outputs};
use super::node::{Node, NodeId};
use super::processor_graph::ProcessorGraph;
use super::validation::validate_structure;
use crate::config::consts::{
    HTTP_REQUEST_FACTORY, JOB_DIRECTORY, JOB_ID, LOCALE, MDC_CONTEXT, OUTPUT_FORMAT, PDF_CONFIG,
    REQUEST_HEADERS, TEMPLATE,
};
use crate::errors::{BuildError, BuildErrors};
use crate::observability::messages::{validation::*, StructuredLog};
use crate::traits::Processor;
use crate::values::AttributeType;

const ATTRIBUTE_PROVIDER: &str = "initial attributes";

#[derive(Debug, Clone, Copy)]
enum Provider {
    Attribute,
    /// `output` indexes the producing node's outputs; `None` for in-place inputs.
    Node { id: NodeId, output: Option<usize> },
}

#[derive(Debug, Clone)]
struct Binding {
    ty: AttributeType,
    provider: Provider,
    renamable: bool,
}

/// Builds [`ProcessorGraph`]s from an ordered processor list and a table of
/// initially available attributes.
///
/// ```
/// use std::sync::Arc;
/// use report_graph::graph::GraphBuilder;
/// use report_graph::backends::local::ChangeTextCaseProcessor;
/// use report_graph::traits::Processor;
///
/// let builder = GraphBuilder::new().attribute::<String>("text");
/// let graph = builder
///     .build(vec![Arc::new(ChangeTextCaseProcessor::upper()) as Arc<dyn Processor>])
///     .unwrap();
///
/// assert_eq!(graph.len(), 1);
/// assert_eq!(graph.root_ids().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    attributes: BTreeMap<String, AttributeType>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// A builder that knows the ambient attributes every job provides.
    pub fn new() -> Self {
        let mut builder = Self::empty();
        for (name, ty) in ambient_attribute_types() {
            builder.attributes.insert(name.to_string(), ty);
        }
        builder
    }

    /// A builder with no initial attributes at all.
    pub fn empty() -> Self {
        Self {
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute<T: std::any::Any + Send + Sync>(self, name: &str) -> Self {
        self.attribute_of(name, AttributeType::of::<T>())
    }

    pub fn attribute_of(mut self, name: &str, ty: AttributeType) -> Self {
        self.attributes.insert(name.to_string(), ty);
        self
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeType> {
        &self.attributes
    }

    pub fn build(&self, processors: Vec<Arc<dyn Processor>>) -> Result<ProcessorGraph, BuildErrors> {
        let started = Instant::now();
        GraphBuildStarted {
            processor_count: processors.len(),
            attribute_count: self.attributes.len(),
        }
        .log();

        let mut state = BuildState::new(&self.attributes);
        for processor in processors {
            state.add(processor);
        }

        let roots: Vec<NodeId> = state
            .nodes
            .iter()
            .filter(|n| n.is_root())
            .map(|n| n.id)
            .collect();
        state
            .errors
            .extend(validate_structure(&state.nodes, &roots));

        if !state.errors.is_empty() {
            for error in &state.errors {
                BuildErrorDetected { error }.log();
            }
            GraphBuildFailed {
                error_count: state.errors.len(),
            }
            .log();
            return Err(BuildErrors(state.errors));
        }

        let graph = ProcessorGraph {
            nodes: state.nodes,
            roots,
            required_attributes: state.required,
        };
        GraphBuildCompleted {
            node_count: graph.len(),
            root_count: graph.root_ids().len(),
            duration: started.elapsed(),
        }
        .log();
        Ok(graph)
    }
}

struct BuildState {
    nodes: Vec<Node>,
    bindings: HashMap<String, Binding>,
    /// Nodes that have registered at least one output so far
    producers: BTreeSet<NodeId>,
    required: BTreeMap<String, AttributeType>,
    errors: Vec<BuildError>,
}

impl BuildState {
    fn new(attributes: &BTreeMap<String, AttributeType>) -> Self {
        let bindings = attributes
            .iter()
            .map(|(name, ty)| {
                (
                    name.clone(),
                    Binding {
                        ty: *ty,
                        provider: Provider::Attribute,
                        renamable: false,
                    },
                )
            })
            .collect();

        Self {
            nodes: Vec::new(),
            bindings,
            producers: BTreeSet::new(),
            required: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    fn provider_label(&self, provider: Provider) -> String {
        match provider {
            Provider::Attribute => ATTRIBUTE_PROVIDER.to_string(),
            Provider::Node { id, .. } => self.nodes[id.index()].label(),
        }
    }

    fn add(&mut self, processor: Arc<dyn Processor>) {
        let id = NodeId(self.nodes.len());
        let label = format!("{}#{}", processor.name(), id);

        let inputs = resolve_inputs(processor.as_ref(), &label).unwrap_or_else(|errors| {
            self.errors.extend(errors);
            Vec::new()
        });

        let mut requirements = BTreeSet::new();

        for input in inputs.iter().filter(|i| i.is_whole_store()) {
            match processor.custom_dependencies() {
                Some(custom) => {
                    for name in custom.dependencies(&self.nodes) {
                        match self.bindings.get(&name).map(|b| (b.provider, b.ty)) {
                            Some((Provider::Node { id, .. }, _)) => {
                                requirements.insert(id);
                            }
                            Some((Provider::Attribute, ty)) => {
                                self.required.insert(name, ty);
                            }
                            None => {}
                        }
                    }
                }
                None => {
                    StoreDependencyFallback {
                        processor: &label,
                        field: &input.field,
                        dependency_count: self.producers.len(),
                    }
                    .log();
                    requirements.extend(self.producers.iter().copied());
                }
            }
        }

        for input in &inputs {
            let Some(ty) = input.attribute_type() else {
                continue;
            };
            match self.bindings.get(&input.name).cloned() {
                None if input.has_default => {}
                None => self.errors.push(BuildError::MissingRequiredInput {
                    processor: label.clone(),
                    attribute: input.name.clone(),
                }),
                Some(binding) if !ty.is_assignable_from(&binding.ty) => {
                    self.errors.push(BuildError::TypeConflict {
                        processor: label.clone(),
                        provider: self.provider_label(binding.provider),
                        attribute: input.name.clone(),
                        expected: ty.to_string(),
                        actual: binding.ty.to_string(),
                    })
                }
                Some(binding) => match binding.provider {
                    Provider::Node { id, .. } => {
                        requirements.insert(id);
                    }
                    Provider::Attribute => {
                        self.required.insert(input.name.clone(), binding.ty);
                    }
                },
            }
        }

        let mut outputs = resolve_outputs(processor.as_ref(), &label).unwrap_or_else(|errors| {
            self.errors.extend(errors);
            Vec::new()
        });

        // The node is pushed before registering outputs so that a rename of an
        // existing output can find consumers through the arena.
        let mut node = Node::new(id, processor, inputs, Vec::new());
        for requirement in &requirements {
            self.nodes[requirement.index()].dependents.insert(id);
        }
        node.requirements = requirements;
        self.nodes.push(node);

        let mut registered = Vec::with_capacity(outputs.len());
        for mut output in outputs.drain(..) {
            let existing = self.bindings.get(&output.name).cloned();
            if let Some(existing) = existing {
                if output.renamable {
                    let renamed = unique_name(&output.name);
                    OutputRenamed {
                        processor: &label,
                        attribute: &output.name,
                        renamed_to: &renamed,
                    }
                    .log();
                    output.name = renamed;
                } else if existing.renamable && self.rename_existing(&output.name).is_some() {
                    // the new output keeps the canonical name
                } else {
                    self.errors.push(BuildError::DuplicateOutput {
                        processor: label.clone(),
                        provider: self.provider_label(existing.provider),
                        attribute: output.name.clone(),
                    });
                    continue;
                }
            }

            self.bindings.insert(
                output.name.clone(),
                Binding {
                    ty: output.ty,
                    provider: Provider::Node {
                        id,
                        output: Some(registered.len()),
                    },
                    renamable: output.renamable,
                },
            );
            self.producers.insert(id);
            registered.push(output);
        }
        self.nodes[id.index()].outputs = registered;

        let in_place: Vec<(String, AttributeType)> = self.nodes[id.index()]
            .inputs
            .iter()
            .filter(|i| i.in_place)
            .filter_map(|i| i.attribute_type().map(|ty| (i.name.clone(), ty)))
            .collect();
        for (name, ty) in in_place {
            self.bindings.insert(
                name,
                Binding {
                    ty,
                    provider: Provider::Node { id, output: None },
                    renamable: false,
                },
            );
            self.producers.insert(id);
        }
    }

    /// Moves the renamable binding currently published as `name` to a fresh name,
    /// rewriting the producing node and every consumer already wired to it.
    fn rename_existing(&mut self, name: &str) -> Option<String> {
        let binding = self.bindings.get(name)?.clone();
        let Provider::Node {
            id: producer,
            output: Some(index),
        } = binding.provider
        else {
            return None;
        };

        let renamed = unique_name(name);
        OutputRenamed {
            processor: &self.nodes[producer.index()].label(),
            attribute: name,
            renamed_to: &renamed,
        }
        .log();

        self.nodes[producer.index()].outputs[index].name = renamed.clone();
        for node in &mut self.nodes {
            if !node.requirements.contains(&producer) {
                continue;
            }
            for input in &mut node.inputs {
                if input.name == name && !input.is_whole_store() {
                    input.name = renamed.clone();
                }
            }
        }

        self.bindings.remove(name);
        self.bindings.insert(renamed.clone(), binding);
        Some(renamed)
    }
}

// Random suffixes are only probabilistically unique; a v4 UUID collision would
// surface as a silent overwrite in the values store.
fn unique_name(name: &str) -> String {
    format!("{}_{}", name, Uuid::new_v4().simple())
}

fn ambient_attribute_types() -> Vec<(&'static str, AttributeType)> {
    vec![
        (JOB_DIRECTORY, AttributeType::of::<PathBuf>()),
        (HTTP_REQUEST_FACTORY, AttributeType::any()),
        (TEMPLATE, AttributeType::any()),
        (PDF_CONFIG, AttributeType::any()),
        (OUTPUT_FORMAT, AttributeType::of::<String>()),
        (JOB_ID, AttributeType::of::<String>()),
        (LOCALE, AttributeType::of::<String>()),
        (MDC_CONTEXT, AttributeType::of::<HashMap<String, String>>()),
        (REQUEST_HEADERS, AttributeType::of::<HashMap<String, String>>()),
    ]
}
