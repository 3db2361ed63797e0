// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::ExecutionContext;
use crate::traits::{InputShape, OutputShape, Processor, ProcessorInput, ProcessorOutput};

/// Reads `text`, writes it reversed (by character) as `reversedText`.
#[derive(Default)]
pub struct ReverseTextProcessor;

impl ReverseTextProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Processor for ReverseTextProcessor {
    async fn execute(
        &self,
        input: ProcessorInput,
        _context: &ExecutionContext,
    ) -> anyhow::Result<ProcessorOutput> {
        let text = input.get::<String>("text")?;
        let reversed: String = text.chars().rev().collect();
        Ok(ProcessorOutput::new().with("reversedText", reversed))
    }

    fn name(&self) -> &str {
        "reverse_text"
    }

    fn input_shape(&self) -> Option<InputShape> {
        Some(InputShape::new().required::<String>("text"))
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::new().field::<String>("reversedText")
    }
}
