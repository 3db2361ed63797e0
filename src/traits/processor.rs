use async_trait::async_trait;
use std::collections::HashMap;

use crate::engine::ExecutionContext;
use crate::graph::Node;
use crate::traits::{InputShape, OutputShape, ProcessorInput, ProcessorOutput};

/// A unit of work in a report pipeline.
///
/// Processors never name each other. They declare which attributes they read
/// (`input_shape`) and which they publish (`output_shape`), and the graph builder
/// derives the execution order from those names and types.
///
/// Mapping tables go from *field name* to *store name*, for inputs and outputs alike.
/// A mapped name is used verbatim; otherwise a configured prefix is applied.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn execute(
        &self,
        input: ProcessorInput,
        context: &ExecutionContext,
    ) -> anyhow::Result<ProcessorOutput>;

    /// Human-readable description used in logs, metrics and error reports.
    fn name(&self) -> &str;

    /// A fresh descriptor of the inputs; `None` when the processor takes no input.
    fn input_shape(&self) -> Option<InputShape>;

    fn output_shape(&self) -> OutputShape;

    fn input_mapper(&self) -> Option<&HashMap<String, String>> {
        None
    }

    fn output_mapper(&self) -> Option<&HashMap<String, String>> {
        None
    }

    fn input_prefix(&self) -> Option<&str> {
        None
    }

    fn output_prefix(&self) -> Option<&str> {
        None
    }

    /// Opt-in capability for processors with a whole-store input that know,
    /// at build time, which attributes they will actually read.
    fn custom_dependencies(&self) -> Option<&dyn CustomDependencies> {
        None
    }
}

/// Template-specific dependency names computed at build time.
pub trait CustomDependencies: Send + Sync {
    /// Attribute names this processor reads, given the nodes built so far.
    fn dependencies(&self, built: &[Node]) -> Vec<String>;
}
