// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engine::ExecutionContext;
use crate::traits::{InputShape, OutputShape, Processor, ProcessorInput, ProcessorOutput};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrefixSuffixAdderConfig {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
}

/// Wraps `text` in a prefix and suffix, writing `decoratedText`.
///
/// `prefix` and `suffix` are optional inputs; when no attribute provides them
/// the configured values are used instead.
pub struct PrefixSuffixAdderProcessor {
    config: PrefixSuffixAdderConfig,
}

impl PrefixSuffixAdderProcessor {
    pub fn new(config: PrefixSuffixAdderConfig) -> Self {
        Self { config }
    }

    pub fn with_prefix_and_suffix(prefix: &str, suffix: &str) -> Self {
        Self::new(PrefixSuffixAdderConfig {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }
}

#[async_trait]
impl Processor for PrefixSuffixAdderProcessor {
    async fn execute(
        &self,
        input: ProcessorInput,
        _context: &ExecutionContext,
    ) -> anyhow::Result<ProcessorOutput> {
        let text = input.get::<String>("text")?;
        let prefix = input
            .get_optional::<String>("prefix")?
            .map(|p| p.to_string())
            .unwrap_or_else(|| self.config.prefix.clone());
        let suffix = input
            .get_optional::<String>("suffix")?
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.config.suffix.clone());

        Ok(ProcessorOutput::new().with("decoratedText", format!("{}{}{}", prefix, text, suffix)))
    }

    fn name(&self) -> &str {
        "prefix_suffix_adder"
    }

    fn input_shape(&self) -> Option<InputShape> {
        Some(
            InputShape::new()
                .required::<String>("text")
                .optional::<String>("prefix")
                .optional::<String>("suffix"),
        )
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::new().field::<String>("decoratedText")
    }
}
