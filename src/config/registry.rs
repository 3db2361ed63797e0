// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::backends::configured::ConfiguredProcessor;
use crate::backends::local::LocalProcessorFactory;
use crate::config::ProcessorConfig;
use crate::errors::ConfigError;
use crate::observability::messages::processor::ProcessorInstantiationFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::Processor;

pub type ProcessorFactory =
    Box<dyn Fn(&ProcessorConfig) -> Result<Arc<dyn Processor>, ConfigError> + Send + Sync>;

/// Maps configured processor types to the factories that instantiate them.
pub struct ProcessorRegistry {
    factories: BTreeMap<String, ProcessorFactory>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_local_processors()
    }
}

impl ProcessorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding every built-in local processor.
    pub fn with_local_processors() -> Self {
        let mut registry = Self::new();
        LocalProcessorFactory::register_all(&mut registry);
        registry
    }

    pub fn register<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&ProcessorConfig) -> Result<Arc<dyn Processor>, ConfigError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.to_string(), Box::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Instantiates one processor and applies its configured mappers and prefixes.
    pub fn create(&self, config: &ProcessorConfig) -> Result<Arc<dyn Processor>, ConfigError> {
        let result = match self.factories.get(&config.kind) {
            Some(factory) => factory(config),
            None => Err(ConfigError::UnknownProcessor {
                kind: config.kind.clone(),
                available: self.kinds(),
            }),
        };

        match result {
            Ok(processor) => Ok(ConfiguredProcessor::wrap(processor, config)),
            Err(error) => {
                ProcessorInstantiationFailed {
                    kind: &config.kind,
                    reason: &error.to_string(),
                }
                .log();
                Err(error)
            }
        }
    }

    /// Instantiates every processor, preserving configuration order.
    pub fn create_all(
        &self,
        configs: &[ProcessorConfig],
    ) -> Result<Vec<Arc<dyn Processor>>, ConfigError> {
        configs.iter().map(|config| self.create(config)).collect()
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Deserializes a processor's `options` table into its typed configuration.
pub fn parse_options<T: DeserializeOwned + Default>(
    config: &ProcessorConfig,
) -> Result<T, ConfigError> {
    if config.options.is_empty() {
        return Ok(T::default());
    }
    let invalid = |error: serde_yaml::Error| ConfigError::InvalidOptions {
        kind: config.kind.clone(),
        reason: error.to_string(),
    };
    let table = serde_yaml::to_value(&config.options).map_err(invalid)?;
    serde_yaml::from_value(table).map_err(invalid)
}
