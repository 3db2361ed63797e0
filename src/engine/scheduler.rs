// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Recursive fork/join scheduler for processor graphs.
//!
//! # Execution Flow
//!
//! A job starts by executing the root frontier. Executing a frontier means
//! claiming every candidate node the context says is eligible, running the
//! first claimed node inline and spawning the rest on the runtime, then
//! joining all of them. Running a node means:
//!
//! 1. checkpoint: stop if the job was cancelled or another branch failed;
//! 2. populate its inputs from the values store;
//! 3. execute the processor while holding a concurrency permit;
//! 4. write its outputs back (absent or `None` outputs remove the entry);
//! 5. mark it finished, whether or not it succeeded;
//! 6. checkpoint again, then execute its dependents as the next frontier.
//!
//! A node with several requirements is claimed by whichever branch finishes
//! its last requirement; every other branch sees `try_start` fail and moves on.
//!
//! # Concurrency
//!
//! Permits are only held around a processor body, never while joining
//! children, so the recursion cannot starve itself of permits.
//!
//! # Failure and cancellation
//!
//! The first processor failure is recorded for the job and aborts it: sibling
//! branches stop at their next checkpoint and the outstanding joins are
//! abandoned. Cancellation is reported as [`ExecutionError::Cancelled`], never
//! as a processor failure.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use super::context::ExecutionContext;
use super::stats::MetricRegistry;
use crate::config::consts::DEFAULT_CONCURRENCY;
use crate::errors::ExecutionError;
use crate::graph::{Node, NodeId, ProcessorGraph};
use crate::observability::messages::engine::{JobCancelled, JobCompleted, JobFailed, JobStarted};
use crate::observability::messages::processor::{
    ProcessorExecutionCompleted, ProcessorExecutionFailed, ProcessorExecutionStarted,
    ProcessorSkipped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{ProcessorInput, ProcessorOutput};
use crate::values::{Value, Values};

type NodeFuture = Pin<Box<dyn Future<Output = Result<(), ExecutionError>> + Send>>;

/// Executes processor graphs with bounded parallelism.
///
/// One scheduler may run any number of jobs, concurrently or in sequence, over
/// shared graphs. The concurrency limit applies across all of them.
///
/// ```
/// use std::sync::Arc;
/// use report_graph::backends::local::ChangeTextCaseProcessor;
/// use report_graph::engine::{ExecutionContext, ForkJoinScheduler};
/// use report_graph::graph::GraphBuilder;
/// use report_graph::traits::Processor;
/// use report_graph::values::Values;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let graph = GraphBuilder::new()
///     .attribute::<String>("text")
///     .build(vec![Arc::new(ChangeTextCaseProcessor::upper()) as Arc<dyn Processor>])?;
///
/// let values = Values::new();
/// values.put("text", "hello".to_string());
///
/// let scheduler = ForkJoinScheduler::new(2);
/// let values = scheduler
///     .execute(Arc::new(graph), values, Arc::new(ExecutionContext::new("job-1")))
///     .await?;
///
/// assert_eq!(*values.get::<String>("changedText")?, "HELLO");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ForkJoinScheduler {
    max_concurrency: usize,
    permits: Arc<Semaphore>,
    metrics: Option<Arc<MetricRegistry>>,
}

impl Default for ForkJoinScheduler {
    /// Concurrency defaults to the number of CPU cores.
    fn default() -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_CONCURRENCY);
        Self::new(concurrency)
    }
}

impl ForkJoinScheduler {
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            max_concurrency,
            permits: Arc::new(Semaphore::new(max_concurrency)),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn metrics(&self) -> Option<&Arc<MetricRegistry>> {
        self.metrics.as_ref()
    }

    /// Runs one job over `graph`, reading and writing `values`.
    ///
    /// Returns the same store on success. On failure or cancellation the store
    /// holds whatever the finished nodes wrote and must not be used as a result.
    pub async fn execute(
        &self,
        graph: Arc<ProcessorGraph>,
        values: Values,
        context: Arc<ExecutionContext>,
    ) -> Result<Values, ExecutionError> {
        let span = context.span().clone();
        self.run(graph, values, context).instrument(span).await
    }

    async fn run(
        &self,
        graph: Arc<ProcessorGraph>,
        values: Values,
        context: Arc<ExecutionContext>,
    ) -> Result<Values, ExecutionError> {
        let started = Instant::now();
        JobStarted {
            job_id: context.job_id(),
            node_count: graph.len(),
            root_count: graph.root_ids().len(),
            max_concurrency: self.max_concurrency,
        }
        .log();

        let job = Arc::new(Job {
            graph: graph.clone(),
            values: values.clone(),
            context: context.clone(),
            permits: self.permits.clone(),
            metrics: self.metrics.clone(),
            failure: Mutex::new(None),
        });

        let roots = graph.root_ids().to_vec();
        let outcome = match execute_frontier(job.clone(), roots, false).await {
            Ok(()) => Ok(()),
            Err(error) => Err(job.take_failure().unwrap_or(error)),
        };

        match outcome {
            Ok(()) => {
                JobCompleted {
                    job_id: context.job_id(),
                    node_count: context.finished_count(),
                    value_count: values.len(),
                    duration: started.elapsed(),
                }
                .log();
                Ok(values)
            }
            Err(error) if error.is_cancellation() => {
                JobCancelled {
                    job_id: context.job_id(),
                    finished_count: context.finished_count(),
                    node_count: graph.len(),
                }
                .log();
                Err(error)
            }
            Err(error) => {
                JobFailed {
                    job_id: context.job_id(),
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }
}

struct Job {
    graph: Arc<ProcessorGraph>,
    values: Values,
    context: Arc<ExecutionContext>,
    permits: Arc<Semaphore>,
    metrics: Option<Arc<MetricRegistry>>,
    /// First real failure of the job
    failure: Mutex<Option<ExecutionError>>,
}

impl Job {
    /// Records `error` if it is the job's first failure and aborts every other branch.
    fn fail(&self, error: ExecutionError) -> ExecutionError {
        let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if failure.is_none() {
            *failure = Some(error);
        }
        self.context.abort();
        ExecutionError::Aborted
    }

    fn take_failure(&self) -> Option<ExecutionError> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn populate_inputs(&self, node: &Node, label: &str) -> Result<ProcessorInput, ExecutionError> {
        let mut input = ProcessorInput::new();
        for field in node.inputs() {
            let Some(ty) = field.attribute_type() else {
                input.insert(field.field.clone(), Arc::new(self.values.clone()) as Value);
                continue;
            };
            match self.values.get_value(&field.name) {
                Some(value) if ty.accepts_value(&value) => input.insert(field.field.clone(), value),
                Some(_) => {
                    return Err(ExecutionError::ValueTypeMismatch {
                        processor: label.to_string(),
                        attribute: field.name.clone(),
                        expected: ty.to_string(),
                    })
                }
                None if field.has_default => {}
                None => {
                    return Err(ExecutionError::MissingValue {
                        processor: label.to_string(),
                        attribute: field.name.clone(),
                        available: self.values.keys(),
                    })
                }
            }
        }
        Ok(input)
    }

    /// Writes declared outputs under their resolved names. In-place inputs are
    /// only written back when the processor returned them.
    fn write_outputs(&self, node: &Node, mut output: ProcessorOutput) -> usize {
        let mut written = 0;
        for field in node.outputs() {
            match output.take(&field.field).flatten() {
                Some(value) => {
                    self.values.put_value(field.name.clone(), value);
                    written += 1;
                }
                None => {
                    self.values.remove(&field.name);
                }
            }
        }
        for field in node.inputs().iter().filter(|i| i.in_place) {
            match output.take(&field.field) {
                Some(Some(value)) => {
                    self.values.put_value(field.name.clone(), value);
                    written += 1;
                }
                Some(None) => {
                    self.values.remove(&field.name);
                }
                None => {}
            }
        }
        written
    }

    async fn execute_processor(&self, node: &Node) -> Result<(), ExecutionError> {
        let label = node.label();
        let input = self.populate_inputs(node, &label)?;

        let started_message = ProcessorExecutionStarted {
            processor: &label,
            input_count: input.field_names().len(),
        };
        started_message.log();
        let span = started_message.span("execute");

        let (result, duration) = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| ExecutionError::InternalError {
                    message: "scheduler permits were closed".to_string(),
                })?;
            let started = Instant::now();
            let result = node
                .processor()
                .execute(input, &self.context)
                .instrument(span)
                .await;
            (result, started.elapsed())
        };

        self.context.stats().record(node.id(), &label, duration);
        if let Some(metrics) = &self.metrics {
            metrics.record_timer(&label, duration);
        }

        match result {
            Ok(output) => {
                let output_count = self.write_outputs(node, output);
                ProcessorExecutionCompleted {
                    processor: &label,
                    output_count,
                    duration,
                }
                .log();
                Ok(())
            }
            Err(error) => {
                self.context.stats().record_failure();
                if let Some(metrics) = &self.metrics {
                    metrics.increment(&format!("{}.failed", label));
                }
                let error = ExecutionError::ProcessorFailed {
                    processor: label.clone(),
                    source: error.into(),
                };
                ProcessorExecutionFailed {
                    processor: &label,
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }
}

/// Claims and runs every eligible node in `candidates`, joining all of them.
///
/// With `tolerate_not_started` unset, a candidate that cannot be claimed is an
/// internal error; that is the case for the root frontier.
fn execute_frontier(
    job: Arc<Job>,
    candidates: Vec<NodeId>,
    tolerate_not_started: bool,
) -> NodeFuture {
    Box::pin(async move {
        let mut inline = None;
        let mut branches = JoinSet::new();

        for id in candidates {
            let node = job.graph.node(id);
            if !job.context.try_start(node) {
                if tolerate_not_started {
                    continue;
                }
                return Err(job.fail(ExecutionError::InternalError {
                    message: format!("root processor '{}' could not be started", node.label()),
                }));
            }
            if inline.is_none() {
                inline = Some(id);
            } else {
                branches.spawn(run_node(job.clone(), id).in_current_span());
            }
        }

        if let Some(id) = inline {
            if let Err(error) = run_node(job.clone(), id).await {
                branches.detach_all();
                return Err(error);
            }
        }

        while let Some(joined) = branches.join_next().await {
            let result = joined.unwrap_or_else(|join_error| {
                Err(job.fail(ExecutionError::InternalError {
                    message: format!("processor branch did not complete: {}", join_error),
                }))
            });
            if let Err(error) = result {
                branches.detach_all();
                return Err(error);
            }
        }
        Ok(())
    })
}

fn run_node(job: Arc<Job>, id: NodeId) -> NodeFuture {
    Box::pin(async move {
        let node = job.graph.node(id);

        if let Err(error) = job.context.check_canceled() {
            ProcessorSkipped {
                processor: &node.label(),
                reason: &error.to_string(),
            }
            .log();
            job.context.finished(node);
            return Err(error);
        }

        // A failed node only counts as finished once the job is aborted, so no
        // dependent can be claimed on its behalf.
        if let Err(error) = job.execute_processor(node).await {
            let error = if job.context.is_canceled() {
                ExecutionError::Cancelled {
                    job_id: job.context.job_id().to_string(),
                }
            } else {
                job.fail(error)
            };
            job.context.finished(node);
            return Err(error);
        }
        job.context.finished(node);

        job.context.check_canceled()?;

        let dependents: Vec<NodeId> = node.dependents().iter().copied().collect();
        execute_frontier(job.clone(), dependents, true).await
    })
}
