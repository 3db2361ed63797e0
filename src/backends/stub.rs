// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configurable processors for testing graph construction and scheduling.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::engine::ExecutionContext;
use crate::graph::Node;
use crate::traits::{
    CustomDependencies, InputShape, OutputShape, Processor, ProcessorInput, ProcessorOutput,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Started { processor: String, inputs: Vec<String> },
    Ended { processor: String },
}

/// Shared, ordered record of processor starts and ends.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<Event>>>,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(&self, processor: &str, inputs: Vec<String>) {
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        self.events.lock().unwrap().push(Event::Started {
            processor: processor.to_string(),
            inputs,
        });
    }

    fn end(&self, processor: &str) {
        self.events.lock().unwrap().push(Event::Ended {
            processor: processor.to_string(),
        });
        self.running.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn position_of_start(&self, processor: &str) -> Option<usize> {
        self.events()
            .iter()
            .position(|e| matches!(e, Event::Started { processor: p, .. } if p == processor))
    }

    pub fn position_of_end(&self, processor: &str) -> Option<usize> {
        self.events()
            .iter()
            .position(|e| matches!(e, Event::Ended { processor: p } if p == processor))
    }

    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Started { processor, .. } => Some(processor),
                Event::Ended { .. } => None,
            })
            .collect()
    }

    pub fn inputs_of(&self, processor: &str) -> Option<Vec<String>> {
        self.events().into_iter().find_map(|e| match e {
            Event::Started { processor: p, inputs } if p == processor => Some(inputs),
            _ => None,
        })
    }

    /// Highest number of processors that were executing at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
enum Behavior {
    Succeed,
    Fail(String),
    CancelJob,
}

/// Dependencies fixed at construction time.
pub struct StaticDependencies(Vec<String>);

impl StaticDependencies {
    pub fn new(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl CustomDependencies for StaticDependencies {
    fn dependencies(&self, _built: &[Node]) -> Vec<String> {
        self.0.clone()
    }
}

/// A processor whose shape and behavior are set by the test.
///
/// Every declared output is written as the string `"<name>.<field>"` unless
/// listed as null or omitted.
pub struct StubProcessor {
    name: String,
    inputs: Option<InputShape>,
    outputs: OutputShape,
    input_mapper: Option<HashMap<String, String>>,
    output_mapper: Option<HashMap<String, String>>,
    input_prefix: Option<String>,
    output_prefix: Option<String>,
    custom_dependencies: Option<StaticDependencies>,
    delay: Option<Duration>,
    behavior: Behavior,
    null_outputs: HashSet<String>,
    omitted_outputs: HashSet<String>,
    journal: Journal,
}

impl StubProcessor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inputs: None,
            outputs: OutputShape::new(),
            input_mapper: None,
            output_mapper: None,
            input_prefix: None,
            output_prefix: None,
            custom_dependencies: None,
            delay: None,
            behavior: Behavior::Succeed,
            null_outputs: HashSet::new(),
            omitted_outputs: HashSet::new(),
            journal: Journal::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: InputShape) -> Self {
        self.inputs = Some(inputs);
        self
    }

    pub fn with_outputs(mut self, outputs: OutputShape) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_input_mapper(mut self, mapper: HashMap<String, String>) -> Self {
        self.input_mapper = Some(mapper);
        self
    }

    pub fn with_output_mapper(mut self, mapper: HashMap<String, String>) -> Self {
        self.output_mapper = Some(mapper);
        self
    }

    pub fn with_input_prefix(mut self, prefix: &str) -> Self {
        self.input_prefix = Some(prefix.to_string());
        self
    }

    pub fn with_output_prefix(mut self, prefix: &str) -> Self {
        self.output_prefix = Some(prefix.to_string());
        self
    }

    pub fn with_custom_dependencies(mut self, dependencies: StaticDependencies) -> Self {
        self.custom_dependencies = Some(dependencies);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = journal.clone();
        self
    }

    pub fn with_null_output(mut self, field: &str) -> Self {
        self.null_outputs.insert(field.to_string());
        self
    }

    pub fn with_omitted_output(mut self, field: &str) -> Self {
        self.omitted_outputs.insert(field.to_string());
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.behavior = Behavior::Fail(message.to_string());
        self
    }

    pub fn cancelling_job(mut self) -> Self {
        self.behavior = Behavior::CancelJob;
        self
    }
}

#[async_trait]
impl Processor for StubProcessor {
    async fn execute(
        &self,
        input: ProcessorInput,
        context: &ExecutionContext,
    ) -> anyhow::Result<ProcessorOutput> {
        self.journal.start(&self.name, input.field_names());

        if let Some(delay) = self.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = context.cancellation_token().cancelled() => {
                    self.journal.end(&self.name);
                    anyhow::bail!("{} interrupted by cancellation", self.name);
                }
            }
        }

        match &self.behavior {
            Behavior::Succeed => {}
            Behavior::Fail(message) => {
                self.journal.end(&self.name);
                anyhow::bail!("{}", message);
            }
            Behavior::CancelJob => context.cancel(),
        }

        let mut output = ProcessorOutput::new();
        for field in self.outputs.fields() {
            if self.omitted_outputs.contains(&field.name) {
                continue;
            }
            if self.null_outputs.contains(&field.name) {
                output.put_none(field.name.clone());
            } else {
                output.put(field.name.clone(), format!("{}.{}", self.name, field.name));
            }
        }

        self.journal.end(&self.name);
        Ok(output)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn input_shape(&self) -> Option<InputShape> {
        self.inputs.clone()
    }

    fn output_shape(&self) -> OutputShape {
        self.outputs.clone()
    }

    fn input_mapper(&self) -> Option<&HashMap<String, String>> {
        self.input_mapper.as_ref()
    }

    fn output_mapper(&self) -> Option<&HashMap<String, String>> {
        self.output_mapper.as_ref()
    }

    fn input_prefix(&self) -> Option<&str> {
        self.input_prefix.as_deref()
    }

    fn output_prefix(&self) -> Option<&str> {
        self.output_prefix.as_deref()
    }

    fn custom_dependencies(&self) -> Option<&dyn CustomDependencies> {
        self.custom_dependencies
            .as_ref()
            .map(|d| d as &dyn CustomDependencies)
    }
}
