// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while running one job over a built processor graph.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The processor body returned an error.
    #[error("Processor '{processor}' failed: {source}")]
    ProcessorFailed {
        processor: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A required input was absent from the values store when the node started.
    ///
    /// Graph construction guarantees a producer for every required input, so this
    /// always points at a graph construction defect.
    #[error("Processor '{processor}' requires '{attribute}' but it is missing at runtime; available values: [{}]", .available.join(", "))]
    MissingValue {
        processor: String,
        attribute: String,
        available: Vec<String>,
    },

    /// The stored value does not have the type the input declares.
    #[error("Processor '{processor}' expects '{attribute}' to be {expected}")]
    ValueTypeMismatch {
        processor: String,
        attribute: String,
        expected: String,
    },

    /// The job was cancelled. Not a failure.
    #[error("Job '{job_id}' was cancelled")]
    Cancelled { job_id: String },

    /// A branch stopped because another branch of the same job failed.
    #[error("Job aborted after a failure in another branch")]
    Aborted,

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl ExecutionError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ExecutionError::Cancelled { .. })
    }
}
