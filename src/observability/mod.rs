// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability: structured log messages and tracing spans.
//!
//! Every diagnostic the crate emits is a small struct with a `Display`
//! implementation and a [`StructuredLog`](messages::StructuredLog) impl that
//! chooses the level and the structured fields. Log text therefore lives in one
//! place per subsystem:
//!
//! * `messages::engine` - job lifecycle in the scheduler
//! * `messages::processor` - individual processor executions
//! * `messages::validation` - graph construction and its diagnostics
//!
//! # Usage
//!
//! ```rust
//! use report_graph::observability::messages::processor::ProcessorExecutionFailed;
//! use report_graph::observability::messages::StructuredLog;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! ProcessorExecutionFailed {
//!     processor: "map#0",
//!     error: &error,
//! }
//! .log();
//! ```
//!
//! Job correlation is carried by the `job` span opened by the execution
//! context; messages logged inside it inherit its `job_id` field.

pub mod messages;
