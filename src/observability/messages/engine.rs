// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for job lifecycle events in the scheduler.
//!
//! This module contains message types for logging events related to:
//! * Job start and scheduler configuration
//! * Job completion, failure and cancellation

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Job execution started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use report_graph::observability::messages::engine::JobStarted;
///
/// let msg = JobStarted {
///     job_id: "job-1",
///     node_count: 5,
///     root_count: 2,
///     max_concurrency: 4,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Starting job 'job-1': 5 processors, 2 roots, max_concurrency=4"
/// );
/// ```
pub struct JobStarted<'a> {
    pub job_id: &'a str,
    pub node_count: usize,
    pub root_count: usize,
    pub max_concurrency: usize,
}

impl Display for JobStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting job '{}': {} processors, {} roots, max_concurrency={}",
            self.job_id, self.node_count, self.root_count, self.max_concurrency
        )
    }
}

impl StructuredLog for JobStarted<'_> {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            root_count = self.root_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "job",
            span_name = name,
            job_id = self.job_id,
            node_count = self.node_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// Job completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct JobCompleted<'a> {
    pub job_id: &'a str,
    pub node_count: usize,
    pub value_count: usize,
    pub duration: std::time::Duration,
}

impl Display for JobCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job '{}' completed: {} processors, {} values in {:?}",
            self.job_id, self.node_count, self.value_count, self.duration
        )
    }
}

impl StructuredLog for JobCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            value_count = self.value_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "job_completed",
            span_name = name,
            job_id = self.job_id,
            duration = ?self.duration,
        )
    }
}

/// Job failed with error.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use report_graph::observability::messages::engine::JobFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = JobFailed {
///     job_id: "job-1",
///     error: &error,
/// };
///
/// assert_eq!(msg.to_string(), "Job 'job-1' failed: test error");
/// ```
pub struct JobFailed<'a> {
    pub job_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for JobFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job '{}' failed: {}", self.job_id, self.error)
    }
}

impl StructuredLog for JobFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "job_failed",
            span_name = name,
            job_id = self.job_id,
            error = %self.error,
        )
    }
}

/// Job was cancelled before every processor finished.
///
/// # Log Level
/// `warn!` - Cancellation is requested by the caller, not a processor failure
pub struct JobCancelled<'a> {
    pub job_id: &'a str,
    pub finished_count: usize,
    pub node_count: usize,
}

impl Display for JobCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job '{}' cancelled after {} of {} processors",
            self.job_id, self.finished_count, self.node_count
        )
    }
}

impl StructuredLog for JobCancelled<'_> {
    fn log(&self) {
        tracing::warn!(
            finished_count = self.finished_count,
            node_count = self.node_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("job_cancelled", span_name = name, job_id = self.job_id)
    }
}
