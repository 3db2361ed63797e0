// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::processors::*;
use crate::config::registry::parse_options;
use crate::config::{ProcessorConfig, ProcessorRegistry};
use crate::errors::ConfigError;
use crate::traits::Processor;

/// Factory for creating local (in-process) processor instances
pub struct LocalProcessorFactory;

impl LocalProcessorFactory {
    /// Create a processor instance from configuration
    ///
    /// The `type` field selects the processor; `options` are processor specific:
    /// - "change_text_case" -> `case: upper | lower | proper | title`
    /// - "reverse_text"
    /// - "token_counter"
    /// - "word_frequency_analyzer"
    /// - "prefix_suffix_adder" -> `prefix`, `suffix`
    /// - "result_collector" -> `strategy`, `sources`, `separator`
    pub fn create_processor(config: &ProcessorConfig) -> Result<Arc<dyn Processor>, ConfigError> {
        match config.kind.as_str() {
            "change_text_case" => Ok(Arc::new(ChangeTextCaseProcessor::new(parse_options(config)?))),
            "reverse_text" => Ok(Arc::new(ReverseTextProcessor::new())),
            "token_counter" => Ok(Arc::new(TokenCounterProcessor::new())),
            "word_frequency_analyzer" => Ok(Arc::new(WordFrequencyAnalyzerProcessor::new())),
            "prefix_suffix_adder" => Ok(Arc::new(PrefixSuffixAdderProcessor::new(parse_options(config)?))),
            "result_collector" => Ok(Arc::new(ResultCollectorProcessor::new(parse_options(config)?))),
            _ => Err(ConfigError::UnknownProcessor {
                kind: config.kind.clone(),
                available: Self::list_available_implementations()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            }),
        }
    }

    /// List all available local processor implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec![
            "change_text_case",
            "reverse_text",
            "token_counter",
            "word_frequency_analyzer",
            "prefix_suffix_adder",
            "result_collector",
        ]
    }

    pub fn register_all(registry: &mut ProcessorRegistry) {
        for kind in Self::list_available_implementations() {
            registry.register(kind, Self::create_processor);
        }
    }
}
