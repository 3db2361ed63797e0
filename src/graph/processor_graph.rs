use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use super::node::{Node, NodeId};
use crate::traits::Processor;
use crate::values::AttributeType;

/// A validated processor DAG.
///
/// Built once per pipeline configuration by [`GraphBuilder`](super::GraphBuilder)
/// and immutable afterwards, so one graph can be shared by any number of jobs.
///
/// The `Display` implementation renders a Graphviz `digraph` for diagnostics.
pub struct ProcessorGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) roots: Vec<NodeId>,
    pub(crate) required_attributes: BTreeMap<String, AttributeType>,
}

impl ProcessorGraph {
    /// Indexes the arena directly; only for ids handed out by this graph.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Looks up a node by id, `None` when the id belongs to another graph.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.roots.iter().map(|id| self.node(*id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Initial attributes (template or ambient) that some processor reads.
    pub fn required_attributes(&self) -> &BTreeMap<String, AttributeType> {
        &self.required_attributes
    }

    pub fn all_processors(&self) -> Vec<Arc<dyn Processor>> {
        self.nodes.iter().map(|n| n.processor.clone()).collect()
    }

    /// Every node reachable from a root by following dependent edges.
    pub fn reachable(&self) -> BTreeSet<NodeId> {
        reachable_from(&self.nodes, &self.roots)
    }
}

pub(crate) fn reachable_from(nodes: &[Node], roots: &[NodeId]) -> BTreeSet<NodeId> {
    let mut seen: BTreeSet<NodeId> = BTreeSet::new();
    let mut queue: VecDeque<NodeId> = roots.iter().copied().collect();

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = nodes.get(id.index()) {
            queue.extend(node.dependents.iter().copied());
        }
    }
    seen
}

impl fmt::Display for ProcessorGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph processors {{")?;
        for node in &self.nodes {
            if node.dependents.is_empty() && node.requirements.is_empty() {
                writeln!(f, "  \"{}\";", node.label())?;
            }
            for dependent in &node.dependents {
                writeln!(
                    f,
                    "  \"{}\" -> \"{}\";",
                    node.label(),
                    self.node(*dependent).label()
                )?;
            }
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for ProcessorGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorGraph")
            .field("nodes", &self.nodes)
            .field("roots", &self.roots)
            .finish()
    }
}
