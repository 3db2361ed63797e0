//! Structural checks run once the forward pass of the graph builder is complete.
//!
//! The builder only ever wires a node to nodes built before it, so neither check is
//! expected to fire; they guard the invariants the scheduler relies on.
//!
//! # Cycle Detection
//! Depth-first search with a recursion stack over dependent edges. A dependent that
//! is still on the stack closes a cycle, and the stack segment from that node on is
//! reported as the cycle path. O(V + E).
//!
//! # Reachability
//! Breadth-first walk from the roots; any node not reached is an orphan.

use std::collections::BTreeSet;

use super::node::{Node, NodeId};
use super::processor_graph::reachable_from;
use crate::errors::BuildError;

pub fn validate_structure(nodes: &[Node], roots: &[NodeId]) -> Vec<BuildError> {
    let mut errors = Vec::new();

    if let Some(cycle) = find_cycle(nodes) {
        errors.push(BuildError::CyclicDependency {
            cycle: cycle.iter().map(|id| nodes[id.index()].label()).collect(),
        });
    }

    let reached = reachable_from(nodes, roots);
    for node in nodes {
        if !reached.contains(&node.id) {
            errors.push(BuildError::OrphanProcessor {
                processor: node.label(),
            });
        }
    }

    errors
}

fn find_cycle(nodes: &[Node]) -> Option<Vec<NodeId>> {
    let mut visited = BTreeSet::new();
    let mut rec_stack = BTreeSet::new();
    let mut path = Vec::new();

    for node in nodes {
        if !visited.contains(&node.id) {
            if let Some(cycle) =
                dfs_cycle_detection(node.id, nodes, &mut visited, &mut rec_stack, &mut path)
            {
                return Some(cycle);
            }
        }
    }
    None
}

fn dfs_cycle_detection(
    id: NodeId,
    nodes: &[Node],
    visited: &mut BTreeSet<NodeId>,
    rec_stack: &mut BTreeSet<NodeId>,
    path: &mut Vec<NodeId>,
) -> Option<Vec<NodeId>> {
    visited.insert(id);
    rec_stack.insert(id);
    path.push(id);

    for &dependent in &nodes[id.index()].dependents {
        if !visited.contains(&dependent) {
            if let Some(cycle) = dfs_cycle_detection(dependent, nodes, visited, rec_stack, path) {
                return Some(cycle);
            }
        } else if rec_stack.contains(&dependent) {
            let cycle_start = path.iter().position(|x| *x == dependent).unwrap_or(0);
            let mut cycle = path[cycle_start..].to_vec();
            cycle.push(dependent);
            return Some(cycle);
        }
    }

    rec_stack.remove(&id);
    path.pop();
    None
}
