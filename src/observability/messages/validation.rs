// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph construction.
//!
//! This module contains message types for logging events related to:
//! * Build lifecycle (start, completion, failure)
//! * Individual configuration errors
//! * Output renames and conservative whole-store wiring

use crate::errors::BuildError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Graph construction started.
///
/// # Log Level
/// `debug!` - Diagnostic information
///
/// # Example
/// ```
/// use report_graph::observability::messages::validation::GraphBuildStarted;
///
/// let msg = GraphBuildStarted {
///     processor_count: 3,
///     attribute_count: 9,
/// };
///
/// assert_eq!(msg.to_string(), "Building processor graph: 3 processors, 9 initial attributes");
/// ```
pub struct GraphBuildStarted {
    pub processor_count: usize,
    pub attribute_count: usize,
}

impl Display for GraphBuildStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Building processor graph: {} processors, {} initial attributes",
            self.processor_count, self.attribute_count
        )
    }
}

impl StructuredLog for GraphBuildStarted {
    fn log(&self) {
        tracing::debug!(
            processor_count = self.processor_count,
            attribute_count = self.attribute_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "graph_build",
            span_name = name,
            processor_count = self.processor_count,
            attribute_count = self.attribute_count,
        )
    }
}

/// Graph construction completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GraphBuildCompleted {
    pub node_count: usize,
    pub root_count: usize,
    pub duration: Duration,
}

impl Display for GraphBuildCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor graph built: {} nodes, {} roots in {:?}",
            self.node_count, self.root_count, self.duration
        )
    }
}

impl StructuredLog for GraphBuildCompleted {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            root_count = self.root_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph_build",
            span_name = name,
            node_count = self.node_count,
            root_count = self.root_count,
        )
    }
}

/// Graph construction failed with one or more configuration errors.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct GraphBuildFailed {
    pub error_count: usize,
}

impl Display for GraphBuildFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor graph configuration failed with {} error(s)",
            self.error_count
        )
    }
}

impl StructuredLog for GraphBuildFailed {
    fn log(&self) {
        tracing::error!(error_count = self.error_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("graph_build", span_name = name, error_count = self.error_count)
    }
}

/// A single configuration error found while building.
///
/// # Log Level
/// `warn!` - each error is reported; the aggregate failure is logged at `error!`
pub struct BuildErrorDetected<'a> {
    pub error: &'a BuildError,
}

impl Display for BuildErrorDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl StructuredLog for BuildErrorDetected<'_> {
    fn log(&self) {
        tracing::warn!(kind = self.error.kind(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("build_error", span_name = name, kind = self.error.kind())
    }
}

/// A renamable output was moved to a unique name to resolve a collision.
///
/// # Log Level
/// `debug!` - Diagnostic information
///
/// # Example
/// ```
/// use report_graph::observability::messages::validation::OutputRenamed;
///
/// let msg = OutputRenamed {
///     processor: "debug#2",
///     attribute: "count",
///     renamed_to: "count_0f3a",
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Processor 'debug#2' output 'count' renamed to 'count_0f3a'"
/// );
/// ```
pub struct OutputRenamed<'a> {
    pub processor: &'a str,
    pub attribute: &'a str,
    pub renamed_to: &'a str,
}

impl Display for OutputRenamed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' output '{}' renamed to '{}'",
            self.processor, self.attribute, self.renamed_to
        )
    }
}

impl StructuredLog for OutputRenamed<'_> {
    fn log(&self) {
        tracing::debug!(
            processor = self.processor,
            attribute = self.attribute,
            renamed_to = self.renamed_to,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "output_renamed",
            span_name = name,
            processor = self.processor,
            attribute = self.attribute,
        )
    }
}

/// A whole-store input fell back to depending on every earlier producer.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct StoreDependencyFallback<'a> {
    pub processor: &'a str,
    pub field: &'a str,
    pub dependency_count: usize,
}

impl Display for StoreDependencyFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' reads the whole store through '{}'; depending on all {} earlier producers",
            self.processor, self.field, self.dependency_count
        )
    }
}

impl StructuredLog for StoreDependencyFallback<'_> {
    fn log(&self) {
        tracing::debug!(
            processor = self.processor,
            field = self.field,
            dependency_count = self.dependency_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "store_dependency",
            span_name = name,
            processor = self.processor,
            dependency_count = self.dependency_count,
        )
    }
}
