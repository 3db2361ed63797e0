// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engine::ExecutionContext;
use crate::traits::{InputShape, OutputShape, Processor, ProcessorInput, ProcessorOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    #[default]
    Upper,
    Lower,
    /// First letter of each word capitalized
    Proper,
    /// Like proper, but short articles and prepositions stay lowercase
    Title,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeTextCaseConfig {
    #[serde(default)]
    pub case: TextCase,
}

/// Reads `text`, writes it in another case as `changedText`.
pub struct ChangeTextCaseProcessor {
    config: ChangeTextCaseConfig,
}

impl ChangeTextCaseProcessor {
    pub fn new(config: ChangeTextCaseConfig) -> Self {
        Self { config }
    }

    pub fn upper() -> Self {
        Self::new(ChangeTextCaseConfig {
            case: TextCase::Upper,
        })
    }

    pub fn lower() -> Self {
        Self::new(ChangeTextCaseConfig {
            case: TextCase::Lower,
        })
    }

    pub fn proper() -> Self {
        Self::new(ChangeTextCaseConfig {
            case: TextCase::Proper,
        })
    }

    pub fn title() -> Self {
        Self::new(ChangeTextCaseConfig {
            case: TextCase::Title,
        })
    }

    pub fn convert(&self, input: &str) -> String {
        match self.config.case {
            TextCase::Upper => input.to_uppercase(),
            TextCase::Lower => input.to_lowercase(),
            TextCase::Proper => input
                .split_whitespace()
                .map(capitalize_word)
                .collect::<Vec<_>>()
                .join(" "),
            TextCase::Title => input
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| {
                    let lower_word = word.to_lowercase();
                    if i == 0 || !is_minor_word(&lower_word) {
                        capitalize_word(word)
                    } else {
                        lower_word
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn is_minor_word(word: &str) -> bool {
    matches!(
        word,
        "a" | "an" | "the" | "and" | "or" | "but" | "in" | "on" | "at" | "to" | "for" | "of" | "with" | "by"
    )
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

#[async_trait]
impl Processor for ChangeTextCaseProcessor {
    async fn execute(
        &self,
        input: ProcessorInput,
        _context: &ExecutionContext,
    ) -> anyhow::Result<ProcessorOutput> {
        let text = input.get::<String>("text")?;
        Ok(ProcessorOutput::new().with("changedText", self.convert(&text)))
    }

    fn name(&self) -> &str {
        "change_text_case"
    }

    fn input_shape(&self) -> Option<InputShape> {
        Some(InputShape::new().required::<String>("text"))
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::new().field::<String>("changedText")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_every_case() {
        let cases = [
            (ChangeTextCaseProcessor::upper(), "hello", "HELLO"),
            (ChangeTextCaseProcessor::lower(), "HELLO", "hello"),
            (ChangeTextCaseProcessor::proper(), "hello wORLD", "Hello World"),
            (
                ChangeTextCaseProcessor::title(),
                "the lord of the rings",
                "The Lord of the Rings",
            ),
        ];
        for (processor, input, expected) in cases {
            assert_eq!(processor.convert(input), expected);
        }
    }

    #[tokio::test]
    async fn writes_changed_text() {
        let processor = ChangeTextCaseProcessor::upper();
        let output = processor
            .execute(
                ProcessorInput::new().with("text", "abc".to_string()),
                &ExecutionContext::new("test"),
            )
            .await
            .unwrap();

        assert_eq!(*output.get::<String>("changedText").unwrap(), "ABC");
    }

    #[tokio::test]
    async fn missing_text_is_an_error() {
        let result = ChangeTextCaseProcessor::lower()
            .execute(ProcessorInput::new(), &ExecutionContext::new("test"))
            .await;
        assert!(result.is_err());
    }
}
