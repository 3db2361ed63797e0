// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Serialize;

use crate::engine::ExecutionContext;
use crate::traits::{InputShape, OutputShape, Processor, ProcessorInput, ProcessorOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenCount {
    pub char_count: usize,
    pub word_count: usize,
    pub line_count: usize,
}

impl TokenCount {
    pub fn of(text: &str) -> Self {
        Self {
            char_count: text.chars().count(),
            word_count: text.split_whitespace().count(),
            line_count: text.lines().count().max(1),
        }
    }
}

/// Counts characters, words and lines of `text`.
///
/// The `tokenCount` output is renamable, so several counters can run in one
/// pipeline without a naming conflict.
#[derive(Default)]
pub struct TokenCounterProcessor;

impl TokenCounterProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Processor for TokenCounterProcessor {
    async fn execute(
        &self,
        input: ProcessorInput,
        _context: &ExecutionContext,
    ) -> anyhow::Result<ProcessorOutput> {
        let text = input.get::<String>("text")?;
        Ok(ProcessorOutput::new().with("tokenCount", TokenCount::of(&text)))
    }

    fn name(&self) -> &str {
        "token_counter"
    }

    fn input_shape(&self) -> Option<InputShape> {
        Some(InputShape::new().required::<String>("text"))
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::new().renamable::<TokenCount>("tokenCount")
    }
}
