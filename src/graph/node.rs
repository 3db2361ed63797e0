use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::attributes::{ResolvedInput, ResolvedOutput};
use crate::traits::Processor;

/// Identity of a node, assigned in configuration order when the graph is built.
///
/// Nodes are never compared by the processor they wrap: two nodes may wrap
/// identically configured processors and still be distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A graph vertex wrapping one configured processor.
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) processor: Arc<dyn Processor>,
    pub(crate) inputs: Vec<ResolvedInput>,
    pub(crate) outputs: Vec<ResolvedOutput>,
    pub(crate) requirements: BTreeSet<NodeId>,
    pub(crate) dependents: BTreeSet<NodeId>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        processor: Arc<dyn Processor>,
        inputs: Vec<ResolvedInput>,
        outputs: Vec<ResolvedOutput>,
    ) -> Self {
        Self {
            id,
            processor,
            inputs,
            outputs,
            requirements: BTreeSet::new(),
            dependents: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn processor(&self) -> &Arc<dyn Processor> {
        &self.processor
    }

    /// `name#index`, unique within a graph.
    pub fn label(&self) -> String {
        format!("{}#{}", self.processor.name(), self.id)
    }

    pub fn inputs(&self) -> &[ResolvedInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ResolvedOutput] {
        &self.outputs
    }

    /// Nodes that must finish before this one may start.
    pub fn requirements(&self) -> &BTreeSet<NodeId> {
        &self.requirements
    }

    /// Nodes that require this one.
    pub fn dependents(&self) -> &BTreeSet<NodeId> {
        &self.dependents
    }

    pub fn is_root(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|o| o.name.as_str())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("label", &self.label())
            .field("requirements", &self.requirements)
            .field("dependents", &self.dependents)
            .finish()
    }
}
