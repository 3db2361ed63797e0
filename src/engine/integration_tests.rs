// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end tests: graphs built from stub processors, executed by the scheduler.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use crate::backends::local::ReverseTextProcessor;
use crate::backends::stub::{Journal, StubProcessor};
use crate::engine::{ExecutionContext, ForkJoinScheduler, MetricRegistry};
use crate::errors::ExecutionError;
use crate::graph::{GraphBuilder, NodeId, ProcessorGraph};
use crate::traits::{InputShape, OutputShape, Processor, ProcessorInput, ProcessorOutput};
use crate::values::Values;

fn graph(builder: GraphBuilder, processors: Vec<StubProcessor>) -> Arc<ProcessorGraph> {
    let processors = processors
        .into_iter()
        .map(|p| Arc::new(p) as Arc<dyn Processor>)
        .collect();
    Arc::new(builder.build(processors).unwrap())
}

async fn run(graph: Arc<ProcessorGraph>, values: Values) -> Result<Values, ExecutionError> {
    ForkJoinScheduler::new(4)
        .execute(graph, values, Arc::new(ExecutionContext::new("test-job")))
        .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn linear_chain_runs_in_dependency_order() {
    let journal = Journal::new();
    let graph = graph(
        GraphBuilder::empty(),
        vec![
            StubProcessor::new("p1")
                .with_outputs(OutputShape::new().field::<String>("a"))
                .with_journal(&journal),
            StubProcessor::new("p2")
                .with_inputs(InputShape::new().required::<String>("a"))
                .with_outputs(OutputShape::new().field::<String>("b"))
                .with_journal(&journal),
            StubProcessor::new("p3")
                .with_inputs(InputShape::new().required::<String>("b"))
                .with_journal(&journal),
        ],
    );

    let values = run(graph, Values::new()).await.unwrap();

    assert_eq!(journal.started(), vec!["p1", "p2", "p3"]);
    assert_eq!(*values.get::<String>("a").unwrap(), "p1.a");
    assert_eq!(*values.get::<String>("b").unwrap(), "p2.b");
    assert_eq!(journal.inputs_of("p2"), Some(vec!["a".to_string()]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_roots_share_an_initial_attribute() {
    let journal = Journal::new();
    let graph = graph(
        GraphBuilder::empty().attribute::<String>("spec"),
        vec![
            StubProcessor::new("p4")
                .with_inputs(InputShape::new().required::<String>("spec"))
                .with_outputs(OutputShape::new().field::<String>("out4"))
                .with_journal(&journal),
            StubProcessor::new("p5")
                .with_inputs(InputShape::new().required::<String>("spec"))
                .with_outputs(OutputShape::new().field::<String>("out5"))
                .with_journal(&journal),
        ],
    );

    let values = Values::new();
    values.put("spec", "layout".to_string());
    let values = run(graph, values).await.unwrap();

    let mut started = journal.started();
    started.sort();
    assert_eq!(started, vec!["p4", "p5"]);
    assert!(values.contains_key("out4"));
    assert!(values.contains_key("out5"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn renamable_outputs_are_stored_under_distinct_names() {
    let graph = graph(
        GraphBuilder::empty(),
        vec![
            StubProcessor::new("first").with_outputs(OutputShape::new().renamable::<String>("count")),
            StubProcessor::new("second").with_outputs(OutputShape::new().renamable::<String>("count")),
        ],
    );
    let renamed = graph.node(NodeId(1)).outputs()[0].name.clone();

    let values = run(graph, Values::new()).await.unwrap();

    assert_eq!(*values.get::<String>("count").unwrap(), "first.count");
    assert_eq!(*values.get::<String>(&renamed).unwrap(), "second.count");
    assert_eq!(values.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn join_node_starts_once_after_both_branches() {
    let journal = Journal::new();
    let graph = graph(
        GraphBuilder::empty(),
        vec![
            StubProcessor::new("a")
                .with_outputs(OutputShape::new().field::<String>("x"))
                .with_journal(&journal),
            StubProcessor::new("b")
                .with_inputs(InputShape::new().required::<String>("x"))
                .with_outputs(OutputShape::new().field::<String>("y"))
                .with_delay(Duration::from_millis(20))
                .with_journal(&journal),
            StubProcessor::new("c")
                .with_inputs(InputShape::new().required::<String>("x"))
                .with_outputs(OutputShape::new().field::<String>("z"))
                .with_delay(Duration::from_millis(5))
                .with_journal(&journal),
            StubProcessor::new("d")
                .with_inputs(InputShape::new().required::<String>("y").required::<String>("z"))
                .with_journal(&journal),
        ],
    );

    run(graph, Values::new()).await.unwrap();

    let d_start = journal.position_of_start("d").unwrap();
    assert!(journal.position_of_end("b").unwrap() < d_start);
    assert!(journal.position_of_end("c").unwrap() < d_start);
    assert_eq!(journal.started().iter().filter(|p| *p == "d").count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn random_graphs_never_start_a_node_before_its_requirements() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..25 {
        let journal = Journal::new();
        let size = rng.gen_range(2..20);
        let mut processors = Vec::with_capacity(size);

        for i in 0..size {
            let mut inputs = InputShape::new();
            for j in 0..i {
                if rng.gen_bool(0.3) {
                    inputs = inputs.required::<String>(&format!("out{}", j));
                }
            }
            processors.push(
                StubProcessor::new(&format!("p{}", i))
                    .with_inputs(inputs)
                    .with_outputs(OutputShape::new().field::<String>(&format!("out{}", i)))
                    .with_delay(Duration::from_micros(rng.gen_range(0..2000)))
                    .with_journal(&journal),
            );
        }

        let graph = graph(GraphBuilder::empty(), processors);
        let context = Arc::new(ExecutionContext::new("random"));
        ForkJoinScheduler::new(4)
            .execute(graph.clone(), Values::new(), context.clone())
            .await
            .unwrap();

        assert_eq!(journal.started().len(), size);
        assert_eq!(context.finished_count(), size);
        for node in graph.nodes() {
            let name = node.processor().name();
            let start = journal.position_of_start(name).unwrap();
            for requirement in node.requirements() {
                let requirement = graph.node(*requirement).processor().name();
                assert!(
                    journal.position_of_end(requirement).unwrap() < start,
                    "{} started before {} finished",
                    name,
                    requirement
                );
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn jobs_sharing_a_graph_use_independent_stores() {
    let graph = Arc::new(
        GraphBuilder::empty()
            .attribute::<String>("text")
            .build(vec![Arc::new(ReverseTextProcessor::new()) as Arc<dyn Processor>])
            .unwrap(),
    );
    let scheduler = ForkJoinScheduler::new(4);

    let first = Values::new();
    first.put("text", "abc".to_string());
    let second = Values::new();
    second.put("text", "xyz".to_string());

    let (first, second) = tokio::join!(
        scheduler.execute(graph.clone(), first, Arc::new(ExecutionContext::new("one"))),
        scheduler.execute(graph.clone(), second, Arc::new(ExecutionContext::new("two"))),
    );

    assert_eq!(*first.unwrap().get::<String>("reversedText").unwrap(), "cba");
    assert_eq!(*second.unwrap().get::<String>("reversedText").unwrap(), "zyx");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn processor_failure_aborts_the_job() {
    let journal = Journal::new();
    let graph = graph(
        GraphBuilder::empty(),
        vec![
            StubProcessor::new("a")
                .with_outputs(OutputShape::new().field::<String>("x"))
                .with_journal(&journal),
            StubProcessor::new("b")
                .with_inputs(InputShape::new().required::<String>("x"))
                .with_outputs(OutputShape::new().field::<String>("y"))
                .failing("legend service unavailable")
                .with_journal(&journal),
            StubProcessor::new("c")
                .with_inputs(InputShape::new().required::<String>("y"))
                .with_journal(&journal),
        ],
    );
    let context = Arc::new(ExecutionContext::new("failing"));

    let error = ForkJoinScheduler::new(2)
        .execute(graph, Values::new(), context.clone())
        .await
        .unwrap_err();

    match &error {
        ExecutionError::ProcessorFailed { processor, source } => {
            assert_eq!(processor, "b#1");
            assert_eq!(source.to_string(), "legend service unavailable");
        }
        other => panic!("expected ProcessorFailed, got {:?}", other),
    }
    assert!(!error.is_cancellation());
    assert_eq!(journal.position_of_start("c"), None);
    assert_eq!(context.stats().failure_count(), 1);
    assert!(context.is_finished(NodeId(1)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failure_stops_sibling_branches_at_their_next_checkpoint() {
    let journal = Journal::new();
    let graph = graph(
        GraphBuilder::empty(),
        vec![
            StubProcessor::new("root")
                .with_outputs(OutputShape::new().field::<String>("x"))
                .with_journal(&journal),
            StubProcessor::new("broken")
                .with_inputs(InputShape::new().required::<String>("x"))
                .failing("boom")
                .with_journal(&journal),
            StubProcessor::new("slow")
                .with_inputs(InputShape::new().required::<String>("x"))
                .with_outputs(OutputShape::new().field::<String>("y"))
                .with_delay(Duration::from_millis(50))
                .with_journal(&journal),
            StubProcessor::new("after_slow")
                .with_inputs(InputShape::new().required::<String>("y"))
                .with_journal(&journal),
        ],
    );

    let error = run(graph, Values::new()).await.unwrap_err();

    assert!(matches!(error, ExecutionError::ProcessorFailed { ref processor, .. } if processor == "broken#1"));
    // The detached sibling finishes its own body but never expands further.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(journal.position_of_start("after_slow"), None);
}

/// Sibling branch that waits until `watched` counts as finished and records
/// whether the job was already aborted at that point.
struct FinishWatcher {
    watched: NodeId,
    saw_abort: mpsc::UnboundedSender<bool>,
}

#[async_trait]
impl Processor for FinishWatcher {
    async fn execute(
        &self,
        _input: ProcessorInput,
        context: &ExecutionContext,
    ) -> anyhow::Result<ProcessorOutput> {
        while !context.is_finished(self.watched) {
            tokio::task::yield_now().await;
        }
        let _ = self.saw_abort.send(context.is_aborted());
        Ok(ProcessorOutput::new().with("z", "watcher.z".to_string()))
    }

    fn name(&self) -> &str {
        "watcher"
    }

    fn input_shape(&self) -> Option<InputShape> {
        Some(InputShape::new().required::<String>("x"))
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::new().field::<String>("z")
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_branch_never_releases_a_shared_dependent() {
    for _ in 0..20 {
        let journal = Journal::new();
        let (saw_abort, mut observed) = mpsc::unbounded_channel();
        let processors: Vec<Arc<dyn Processor>> = vec![
            Arc::new(
                StubProcessor::new("root")
                    .with_outputs(OutputShape::new().field::<String>("x"))
                    .with_journal(&journal),
            ),
            Arc::new(
                StubProcessor::new("broken")
                    .with_inputs(InputShape::new().required::<String>("x"))
                    .with_outputs(OutputShape::new().field::<String>("y"))
                    .with_delay(Duration::from_millis(5))
                    .failing("legend service unavailable")
                    .with_journal(&journal),
            ),
            Arc::new(FinishWatcher {
                watched: NodeId(1),
                saw_abort,
            }),
            Arc::new(
                StubProcessor::new("joined")
                    .with_inputs(InputShape::new().required::<String>("y").required::<String>("z"))
                    .with_journal(&journal),
            ),
        ];
        let graph = Arc::new(GraphBuilder::empty().build(processors).unwrap());

        let error = run(graph, Values::new()).await.unwrap_err();

        assert!(
            matches!(error, ExecutionError::ProcessorFailed { ref processor, .. } if processor == "broken#1"),
            "unexpected error: {:?}",
            error
        );
        let aborted_first = tokio::time::timeout(Duration::from_secs(1), observed.recv())
            .await
            .unwrap();
        assert_eq!(aborted_first, Some(true));
        assert_eq!(journal.position_of_start("joined"), None);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancellation_is_reported_distinctly_from_failure() {
    let journal = Journal::new();
    let graph = graph(
        GraphBuilder::empty(),
        vec![
            StubProcessor::new("canceller")
                .with_outputs(OutputShape::new().field::<String>("x"))
                .cancelling_job()
                .with_journal(&journal),
            StubProcessor::new("next")
                .with_inputs(InputShape::new().required::<String>("x"))
                .with_journal(&journal),
        ],
    );
    let context = Arc::new(ExecutionContext::new("cancelled-job"));

    let error = ForkJoinScheduler::new(2)
        .execute(graph, Values::new(), context.clone())
        .await
        .unwrap_err();

    match error {
        ExecutionError::Cancelled { job_id } => assert_eq!(job_id, "cancelled-job"),
        other => panic!("expected Cancelled, got {:?}", other),
    }
    assert_eq!(journal.position_of_start("next"), None);
    assert_eq!(context.stats().failure_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn processor_interrupted_by_cancellation_is_not_a_failure() {
    let graph = graph(
        GraphBuilder::empty(),
        vec![
            StubProcessor::new("slow").with_delay(Duration::from_secs(30)),
            StubProcessor::new("fast"),
        ],
    );
    let context = Arc::new(ExecutionContext::new("interrupted"));

    let canceller = context.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let error = ForkJoinScheduler::new(2)
        .execute(graph, Values::new(), context)
        .await
        .unwrap_err();

    assert!(error.is_cancellation());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_context_runs_nothing() {
    let journal = Journal::new();
    let graph = graph(
        GraphBuilder::empty(),
        vec![StubProcessor::new("never").with_journal(&journal)],
    );
    let context = Arc::new(ExecutionContext::new("pre-cancelled"));
    context.cancel();

    let error = ForkJoinScheduler::new(1)
        .execute(graph, Values::new(), context)
        .await
        .unwrap_err();

    assert!(error.is_cancellation());
    assert!(journal.started().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_initial_value_fails_at_runtime() {
    let graph = graph(
        GraphBuilder::empty().attribute::<String>("spec"),
        vec![StubProcessor::new("map").with_inputs(InputShape::new().required::<String>("spec"))],
    );
    let values = Values::new();
    values.put("locale", "en".to_string());

    let error = run(graph, values).await.unwrap_err();

    match error {
        ExecutionError::MissingValue {
            processor,
            attribute,
            available,
        } => {
            assert_eq!(processor, "map#0");
            assert_eq!(attribute, "spec");
            assert_eq!(available, vec!["locale".to_string()]);
        }
        other => panic!("expected MissingValue, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn mistyped_value_fails_at_runtime() {
    let graph = graph(
        GraphBuilder::empty().attribute::<String>("spec"),
        vec![StubProcessor::new("map").with_inputs(InputShape::new().required::<String>("spec"))],
    );
    let values = Values::new();
    values.put("spec", 42_u32);

    let error = run(graph, values).await.unwrap_err();
    assert!(matches!(error, ExecutionError::ValueTypeMismatch { ref attribute, .. } if attribute == "spec"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn absent_optional_input_is_not_populated() {
    let journal = Journal::new();
    let graph = graph(
        GraphBuilder::empty(),
        vec![StubProcessor::new("map")
            .with_inputs(InputShape::new().optional::<u32>("dpi"))
            .with_journal(&journal)],
    );

    run(graph, Values::new()).await.unwrap();
    assert_eq!(journal.inputs_of("map"), Some(Vec::new()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn null_and_omitted_outputs_remove_stored_values() {
    let graph = graph(
        GraphBuilder::empty(),
        vec![StubProcessor::new("cleaner")
            .with_outputs(
                OutputShape::new()
                    .field::<String>("nulled")
                    .field::<String>("omitted")
                    .field::<String>("kept"),
            )
            .with_null_output("nulled")
            .with_omitted_output("omitted")],
    );
    let values = Values::new();
    values.put("nulled", "old".to_string());
    values.put("omitted", "old".to_string());

    let values = run(graph, values).await.unwrap();

    assert!(!values.contains_key("nulled"));
    assert!(!values.contains_key("omitted"));
    assert_eq!(*values.get::<String>("kept").unwrap(), "cleaner.kept");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn resolved_names_are_used_in_the_store() {
    let graph = graph(
        GraphBuilder::empty().attribute::<String>("mapSpec"),
        vec![StubProcessor::new("map")
            .with_inputs(InputShape::new().required::<String>("spec"))
            .with_input_prefix("map")
            .with_outputs(OutputShape::new().field::<String>("image").field::<String>("bbox"))
            .with_output_prefix("map")
            .with_output_mapper(HashMap::from([("bbox".to_string(), "extent".to_string())]))],
    );
    let values = Values::new();
    values.put("mapSpec", "{}".to_string());

    let values = run(graph, values).await.unwrap();

    assert_eq!(*values.get::<String>("mapImage").unwrap(), "map.image");
    assert_eq!(*values.get::<String>("extent").unwrap(), "map.bbox");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn whole_store_input_receives_the_job_store() {
    let journal = Journal::new();
    let graph = graph(
        GraphBuilder::empty(),
        vec![
            StubProcessor::new("map").with_outputs(OutputShape::new().field::<String>("mapImage")),
            StubProcessor::new("report")
                .with_inputs(InputShape::new().whole_store("values"))
                .with_journal(&journal),
        ],
    );

    run(graph, Values::new()).await.unwrap();
    assert_eq!(journal.inputs_of("report"), Some(vec!["values".to_string()]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_is_bounded_by_the_scheduler() {
    let journal = Journal::new();
    let processors = (0..6)
        .map(|i| {
            StubProcessor::new(&format!("root{}", i))
                .with_delay(Duration::from_millis(20))
                .with_journal(&journal)
        })
        .collect();
    let graph = graph(GraphBuilder::empty(), processors);

    ForkJoinScheduler::new(2)
        .execute(graph, Values::new(), Arc::new(ExecutionContext::new("bounded")))
        .await
        .unwrap();

    assert_eq!(journal.started().len(), 6);
    assert!(journal.peak_concurrency() <= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn timings_exclude_time_queued_for_a_permit() {
    let delay = Duration::from_millis(100);
    let processors = (0..3)
        .map(|i| StubProcessor::new(&format!("r{}", i)).with_delay(delay))
        .collect();
    let graph = graph(GraphBuilder::empty(), processors);
    let context = Arc::new(ExecutionContext::new("queued"));

    ForkJoinScheduler::new(1)
        .execute(graph, Values::new(), context.clone())
        .await
        .unwrap();

    let timings = context.stats().timings();
    assert_eq!(timings.len(), 3);
    for timing in timings {
        assert!(
            timing.duration >= delay && timing.duration < delay + Duration::from_millis(80),
            "{} recorded {:?} for a {:?} body",
            timing.processor,
            timing.duration,
            delay
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn metrics_and_stats_are_recorded() {
    let graph = graph(
        GraphBuilder::empty(),
        vec![
            StubProcessor::new("map").with_outputs(OutputShape::new().field::<String>("mapImage")),
            StubProcessor::new("legend")
                .with_inputs(InputShape::new().required::<String>("mapImage")),
        ],
    );
    let metrics = Arc::new(MetricRegistry::new());
    let scheduler = ForkJoinScheduler::new(2).with_metrics(metrics.clone());

    for job in ["one", "two"] {
        let context = Arc::new(ExecutionContext::new(job));
        scheduler
            .execute(graph.clone(), Values::new(), context.clone())
            .await
            .unwrap();
        assert_eq!(context.stats().timings().len(), 2);
    }

    assert_eq!(metrics.timer("map#0").unwrap().count, 2);
    assert_eq!(metrics.timer("legend#1").unwrap().count, 2);
}

#[tokio::test]
async fn empty_graph_completes_immediately() {
    let graph = Arc::new(GraphBuilder::empty().build(Vec::new()).unwrap());
    let values = Values::new();
    values.put("kept", 1_u8);

    let values = run(graph, values).await.unwrap();
    assert_eq!(values.len(), 1);
}
