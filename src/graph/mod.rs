// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod attributes;
pub mod builder;
pub mod node;
pub mod processor_graph;
pub mod validation;

pub use attributes::{ResolvedInput, ResolvedOutput};
pub use builder::GraphBuilder;
pub use node::{Node, NodeId};
pub use processor_graph::ProcessorGraph;
