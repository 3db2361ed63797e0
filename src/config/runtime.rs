// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::{Config, ProcessorRegistry};
use crate::engine::{ExecutionContext, ForkJoinScheduler};
use crate::errors::{ConfigError, ExecutionError};
use crate::graph::{GraphBuilder, ProcessorGraph};
use crate::values::Values;

/// A built processor graph together with the scheduler configured to run it.
///
/// The graph is immutable and shared; every call to [`Runtime::run`] is an
/// independent job with its own values store and execution context.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub graph: Arc<ProcessorGraph>,
    pub scheduler: ForkJoinScheduler,
}

impl Runtime {
    pub async fn run(
        &self,
        values: Values,
        context: Arc<ExecutionContext>,
    ) -> Result<Values, ExecutionError> {
        self.scheduler
            .execute(self.graph.clone(), values, context)
            .await
    }
}

/// Runtime builder - orchestrates processor instantiation, graph construction
/// and scheduler creation from configuration.
///
/// # Examples
///
/// ```
/// use report_graph::config::{parse_config, RuntimeBuilder};
///
/// let config = parse_config(
///     r#"
/// attributes:
///   text: string
/// processors:
///   - type: reverse_text
///   - type: token_counter
///     input_mapper:
///       text: reversedText
/// "#,
/// )
/// .unwrap();
///
/// let runtime = RuntimeBuilder::from_config(&config).unwrap();
/// assert_eq!(runtime.graph.len(), 2);
/// assert_eq!(runtime.graph.root_ids().len(), 1);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build a runtime using the built-in local processors.
    pub fn from_config(cfg: &Config) -> Result<Runtime, ConfigError> {
        Self::from_config_with_registry(cfg, &ProcessorRegistry::default())
    }

    /// Build a runtime resolving processor types through `registry`.
    ///
    /// The graph sees the ambient attributes plus the template attributes
    /// declared in `cfg`. Every configuration error is reported at once.
    pub fn from_config_with_registry(
        cfg: &Config,
        registry: &ProcessorRegistry,
    ) -> Result<Runtime, ConfigError> {
        let processors = registry.create_all(&cfg.processors)?;

        let builder = cfg
            .attributes
            .iter()
            .fold(GraphBuilder::new(), |builder, (name, declared)| {
                builder.attribute_of(name, declared.attribute_type())
            });
        let graph = builder.build(processors)?;

        let scheduler = cfg
            .executor_options
            .max_concurrency
            .map(ForkJoinScheduler::new)
            .unwrap_or_default();

        Ok(Runtime {
            graph: Arc::new(graph),
            scheduler,
        })
    }
}
