// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-job execution statistics and a cross-job metric registry.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::graph::NodeId;

/// Wall-clock duration of one processor execution.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTiming {
    pub node: NodeId,
    pub processor: String,
    pub duration: Duration,
}

/// Statistics recorded while a single job runs.
#[derive(Debug, Default)]
pub struct ExecutionStats {
    timings: Mutex<Vec<NodeTiming>>,
    failures: AtomicUsize,
}

impl ExecutionStats {
    pub fn record(&self, node: NodeId, processor: &str, duration: Duration) {
        self.timings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(NodeTiming {
                node,
                processor: processor.to_string(),
                duration,
            });
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Timings in completion order.
    pub fn timings(&self) -> Vec<NodeTiming> {
        self.timings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn timing(&self, node: NodeId) -> Option<Duration> {
        self.timings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|t| t.node == node)
            .map(|t| t.duration)
    }

    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Sum of all processor durations; exceeds wall-clock time when branches ran in parallel.
    pub fn total_processor_time(&self) -> Duration {
        self.timings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|t| t.duration)
            .sum()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    pub count: u64,
    pub total: Duration,
    pub max: Duration,
}

impl TimerSnapshot {
    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total / self.count as u32
        }
    }
}

/// Timers and counters aggregated over every job that shares the registry.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    timers: Mutex<BTreeMap<String, TimerSnapshot>>,
    counters: Mutex<BTreeMap<String, u64>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_timer(&self, name: &str, duration: Duration) {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        let timer = timers.entry(name.to_string()).or_default();
        timer.count += 1;
        timer.total += duration;
        timer.max = timer.max.max(duration);
    }

    pub fn increment(&self, name: &str) {
        *self
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default() += 1;
    }

    pub fn timer(&self, name: &str) -> Option<TimerSnapshot> {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub fn timer_names(&self) -> Vec<String> {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
