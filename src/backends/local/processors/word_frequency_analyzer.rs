// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::engine::ExecutionContext;
use crate::traits::{InputShape, OutputShape, Processor, ProcessorInput, ProcessorOutput};

pub type WordFrequencies = BTreeMap<String, usize>;

/// Case-insensitive word counts of `text`, written as `wordFrequencies`.
#[derive(Default)]
pub struct WordFrequencyAnalyzerProcessor;

impl WordFrequencyAnalyzerProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(text: &str) -> WordFrequencies {
        let mut frequencies = WordFrequencies::new();
        for word in text.split_whitespace() {
            let cleaned: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            if !cleaned.is_empty() {
                *frequencies.entry(cleaned).or_insert(0) += 1;
            }
        }
        frequencies
    }
}

#[async_trait]
impl Processor for WordFrequencyAnalyzerProcessor {
    async fn execute(
        &self,
        input: ProcessorInput,
        _context: &ExecutionContext,
    ) -> anyhow::Result<ProcessorOutput> {
        let text = input.get::<String>("text")?;
        Ok(ProcessorOutput::new().with("wordFrequencies", Self::analyze(&text)))
    }

    fn name(&self) -> &str {
        "word_frequency_analyzer"
    }

    fn input_shape(&self) -> Option<InputShape> {
        Some(InputShape::new().required::<String>("text"))
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::new().field::<WordFrequencies>("wordFrequencies")
    }
}
