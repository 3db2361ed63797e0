// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-job execution state shared by every branch of one run.
//!
//! The running and finished sets live under a single mutex so that the
//! eligibility check in [`ExecutionContext::try_start`] (all requirements
//! finished, node neither running nor finished) and the transition to running
//! are one atomic step. That is what guarantees a node with several
//! requirements is started exactly once, by whichever branch completes its
//! last requirement.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::Span;
use uuid::Uuid;

use super::stats::ExecutionStats;
use crate::errors::ExecutionError;
use crate::graph::{Node, NodeId};

#[derive(Debug, Default)]
struct RunState {
    running: HashSet<NodeId>,
    finished: HashSet<NodeId>,
}

#[derive(Debug)]
pub struct ExecutionContext {
    job_id: String,
    state: Mutex<RunState>,
    token: CancellationToken,
    aborted: AtomicBool,
    stats: ExecutionStats,
    span: Span,
}

impl ExecutionContext {
    pub fn new(job_id: impl Into<String>) -> Self {
        let job_id = job_id.into();
        let span = tracing::info_span!("job", job_id = %job_id);
        Self {
            job_id,
            state: Mutex::new(RunState::default()),
            token: CancellationToken::new(),
            aborted: AtomicBool::new(false),
            stats: ExecutionStats::default(),
            span,
        }
    }

    pub fn with_random_job_id() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// The `job` span every log line of this job is recorded under.
    pub fn span(&self) -> &Span {
        &self.span
    }

    fn state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `node` running if all of its requirements have finished and it has
    /// not been started yet. Returns whether the caller now owns the node.
    pub fn try_start(&self, node: &Node) -> bool {
        let mut state = self.state();
        if state.running.contains(&node.id()) || state.finished.contains(&node.id()) {
            return false;
        }
        if !node
            .requirements()
            .iter()
            .all(|requirement| state.finished.contains(requirement))
        {
            return false;
        }
        state.running.insert(node.id());
        true
    }

    /// Moves `node` from running to finished, whether or not it succeeded.
    pub fn finished(&self, node: &Node) {
        let mut state = self.state();
        state.running.remove(&node.id());
        state.finished.insert(node.id());
    }

    pub fn is_finished(&self, id: NodeId) -> bool {
        self.state().finished.contains(&id)
    }

    pub fn is_running(&self, id: NodeId) -> bool {
        self.state().running.contains(&id)
    }

    pub fn finished_count(&self) -> usize {
        self.state().finished.len()
    }

    /// Requests cancellation. Branches notice at their next checkpoint;
    /// processors may poll [`is_canceled`](Self::is_canceled) or await
    /// [`cancellation_token`](Self::cancellation_token) themselves.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Stops further scheduling after a processor failure.
    pub(crate) fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Checkpoint between nodes: cancellation wins over an abort caused by a failure.
    pub fn check_canceled(&self) -> Result<(), ExecutionError> {
        if self.is_canceled() {
            return Err(ExecutionError::Cancelled {
                job_id: self.job_id.clone(),
            });
        }
        if self.is_aborted() {
            return Err(ExecutionError::Aborted);
        }
        Ok(())
    }

    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::StubProcessor;
    use crate::graph::GraphBuilder;
    use crate::traits::{InputShape, OutputShape, Processor};
    use std::sync::Arc;

    fn diamond() -> crate::graph::ProcessorGraph {
        let processors: Vec<Arc<dyn Processor>> = vec![
            Arc::new(StubProcessor::new("a").with_outputs(OutputShape::new().field::<String>("x"))),
            Arc::new(StubProcessor::new("b")
                .with_inputs(InputShape::new().required::<String>("x"))
                .with_outputs(OutputShape::new().field::<String>("y"))),
            Arc::new(StubProcessor::new("c")
                .with_inputs(InputShape::new().required::<String>("x"))
                .with_outputs(OutputShape::new().field::<String>("z"))),
            Arc::new(StubProcessor::new("d").with_inputs(
                InputShape::new().required::<String>("y").required::<String>("z"),
            )),
        ];
        GraphBuilder::empty().build(processors).unwrap()
    }

    #[test]
    fn node_starts_only_after_all_requirements_finish() {
        let graph = diamond();
        let context = ExecutionContext::new("job");
        let [a, b, c, d] = [0, 1, 2, 3].map(|i| graph.node(NodeId(i)));

        assert!(!context.try_start(b));
        assert!(context.try_start(a));
        assert!(!context.try_start(a));
        context.finished(a);
        assert!(!context.try_start(a));

        assert!(context.try_start(b));
        context.finished(b);
        assert!(!context.try_start(d));

        assert!(context.try_start(c));
        assert!(context.is_running(c.id()));
        context.finished(c);

        assert!(context.try_start(d));
        assert!(!context.try_start(d));
        assert_eq!(context.finished_count(), 3);
    }

    #[test]
    fn cancellation_is_reported_before_abort() {
        let context = ExecutionContext::new("job-7");
        assert!(context.check_canceled().is_ok());

        context.abort();
        assert!(matches!(context.check_canceled(), Err(ExecutionError::Aborted)));

        context.cancel();
        match context.check_canceled() {
            Err(ExecutionError::Cancelled { job_id }) => assert_eq!(job_id, "job-7"),
            other => panic!("expected cancellation, got {:?}", other),
        }
        assert!(context.cancellation_token().is_cancelled());
    }

    #[test]
    fn random_job_ids_differ() {
        let first = ExecutionContext::with_random_job_id();
        let second = ExecutionContext::with_random_job_id();
        assert_ne!(first.job_id(), second.job_id());
    }
}
