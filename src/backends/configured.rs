// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Applies the mapping tables and prefixes from a processor's configuration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProcessorConfig;
use crate::engine::ExecutionContext;
use crate::traits::{
    CustomDependencies, InputShape, OutputShape, Processor, ProcessorInput, ProcessorOutput,
};

/// A processor whose name resolution comes from configuration rather than code.
///
/// Every other capability, including custom dependencies, is delegated.
pub struct ConfiguredProcessor {
    inner: Arc<dyn Processor>,
    input_mapper: Option<HashMap<String, String>>,
    output_mapper: Option<HashMap<String, String>>,
    input_prefix: Option<String>,
    output_prefix: Option<String>,
}

impl ConfiguredProcessor {
    /// Wraps `inner` only when `config` customizes name resolution.
    pub fn wrap(inner: Arc<dyn Processor>, config: &ProcessorConfig) -> Arc<dyn Processor> {
        if config.input_mapper.is_none()
            && config.output_mapper.is_none()
            && config.input_prefix.is_none()
            && config.output_prefix.is_none()
        {
            return inner;
        }

        Arc::new(Self {
            inner,
            input_mapper: config.input_mapper.clone(),
            output_mapper: config.output_mapper.clone(),
            input_prefix: config.input_prefix.clone(),
            output_prefix: config.output_prefix.clone(),
        })
    }
}

#[async_trait]
impl Processor for ConfiguredProcessor {
    async fn execute(
        &self,
        input: ProcessorInput,
        context: &ExecutionContext,
    ) -> anyhow::Result<ProcessorOutput> {
        self.inner.execute(input, context).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn input_shape(&self) -> Option<InputShape> {
        self.inner.input_shape()
    }

    fn output_shape(&self) -> OutputShape {
        self.inner.output_shape()
    }

    fn input_mapper(&self) -> Option<&HashMap<String, String>> {
        self.input_mapper.as_ref().or_else(|| self.inner.input_mapper())
    }

    fn output_mapper(&self) -> Option<&HashMap<String, String>> {
        self.output_mapper.as_ref().or_else(|| self.inner.output_mapper())
    }

    fn input_prefix(&self) -> Option<&str> {
        self.input_prefix.as_deref().or_else(|| self.inner.input_prefix())
    }

    fn output_prefix(&self) -> Option<&str> {
        self.output_prefix.as_deref().or_else(|| self.inner.output_prefix())
    }

    fn custom_dependencies(&self) -> Option<&dyn CustomDependencies> {
        self.inner.custom_dependencies()
    }
}
