// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for processor execution and lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Processor instantiation from configuration
//! * Processor execution lifecycle (start, completion, failure)
//! * Nodes skipped because the job stopped

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Processor execution started.
///
/// # Log Level
/// `debug!` - Diagnostic information
///
/// # Example
/// ```
/// use report_graph::observability::messages::processor::ProcessorExecutionStarted;
///
/// let msg = ProcessorExecutionStarted {
///     processor: "legend#1",
///     input_count: 2,
/// };
///
/// assert_eq!(msg.to_string(), "Processor 'legend#1' execution started: 2 inputs");
/// ```
pub struct ProcessorExecutionStarted<'a> {
    pub processor: &'a str,
    pub input_count: usize,
}

impl Display for ProcessorExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' execution started: {} inputs",
            self.processor, self.input_count
        )
    }
}

impl StructuredLog for ProcessorExecutionStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            processor = self.processor,
            input_count = self.input_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processor",
            span_name = name,
            processor = self.processor,
            input_count = self.input_count,
        )
    }
}

/// Processor execution completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProcessorExecutionCompleted<'a> {
    pub processor: &'a str,
    pub output_count: usize,
    pub duration: std::time::Duration,
}

impl Display for ProcessorExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' completed: {} outputs, duration={:?}",
            self.processor, self.output_count, self.duration
        )
    }
}

impl StructuredLog for ProcessorExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            processor = self.processor,
            output_count = self.output_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processor_completed",
            span_name = name,
            processor = self.processor,
            duration = ?self.duration,
        )
    }
}

/// Processor execution failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use report_graph::observability::messages::processor::ProcessorExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = ProcessorExecutionFailed {
///     processor: "map#0",
///     error: &error,
/// };
///
/// assert_eq!(msg.to_string(), "Processor 'map#0' execution failed: test error");
/// ```
pub struct ProcessorExecutionFailed<'a> {
    pub processor: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProcessorExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' execution failed: {}",
            self.processor, self.error
        )
    }
}

impl StructuredLog for ProcessorExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            processor = self.processor,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "processor_failed",
            span_name = name,
            processor = self.processor,
            error = %self.error,
        )
    }
}

/// A ready node was not started because the job had already stopped.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct ProcessorSkipped<'a> {
    pub processor: &'a str,
    pub reason: &'a str,
}

impl Display for ProcessorSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Processor '{}' skipped: {}", self.processor, self.reason)
    }
}

impl StructuredLog for ProcessorSkipped<'_> {
    fn log(&self) {
        tracing::debug!(processor = self.processor, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("processor_skipped", span_name = name, processor = self.processor)
    }
}

/// Processor instantiation from configuration failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use report_graph::observability::messages::processor::ProcessorInstantiationFailed;
///
/// let msg = ProcessorInstantiationFailed {
///     kind: "unknown_processor",
///     reason: "no factory registered",
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Failed to instantiate processor of type 'unknown_processor': no factory registered"
/// );
/// ```
pub struct ProcessorInstantiationFailed<'a> {
    pub kind: &'a str,
    pub reason: &'a str,
}

impl Display for ProcessorInstantiationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to instantiate processor of type '{}': {}",
            self.kind, self.reason
        )
    }
}

impl StructuredLog for ProcessorInstantiationFailed<'_> {
    fn log(&self) {
        tracing::error!(kind = self.kind, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("processor_instantiation", span_name = name, kind = self.kind)
    }
}
