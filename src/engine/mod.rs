// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod context;
pub mod scheduler;
pub mod stats;
#[cfg(test)]
mod integration_tests;

pub use context::ExecutionContext;
pub use scheduler::ForkJoinScheduler;
pub use stats::{ExecutionStats, MetricRegistry, NodeTiming, TimerSnapshot};
