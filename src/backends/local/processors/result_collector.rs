// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Collects values produced earlier in the pipeline into a single `report`.
//!
//! The collector reads the whole values store. Without configured `sources` it
//! depends on every earlier producer and collects every stored value. With
//! `sources` it only waits for the producers of those names; a source ending
//! in `*` matches every name with that prefix, which is how renamed outputs
//! (such as several `tokenCount` values) are collected.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as Json};
use std::collections::HashMap;
use std::path::PathBuf;

use super::token_counter::TokenCount;
use super::word_frequency_analyzer::WordFrequencies;
use crate::engine::ExecutionContext;
use crate::graph::Node;
use crate::traits::{
    CustomDependencies, InputShape, OutputShape, Processor, ProcessorInput, ProcessorOutput,
};
use crate::values::{Value, Values};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStrategy {
    /// The first source that has a value
    FirstAvailable,
    /// Every source rendered as text and joined with the separator
    Concatenate,
    /// A JSON object keyed by attribute name
    #[default]
    JsonMerge,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResultCollectorConfig {
    #[serde(default)]
    pub strategy: CollectionStrategy,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub separator: Option<String>,
}

struct SourceDependencies(Vec<String>);

impl SourceDependencies {
    fn matches(pattern: &str, name: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => name.starts_with(prefix),
            None => pattern == name,
        }
    }
}

impl CustomDependencies for SourceDependencies {
    fn dependencies(&self, built: &[Node]) -> Vec<String> {
        let mut names = Vec::new();
        for pattern in &self.0 {
            if !pattern.ends_with('*') {
                names.push(pattern.clone());
                continue;
            }
            names.extend(
                built
                    .iter()
                    .flat_map(|node| node.output_names())
                    .filter(|name| Self::matches(pattern, name))
                    .map(str::to_string),
            );
        }
        names
    }
}

pub struct ResultCollectorProcessor {
    config: ResultCollectorConfig,
    sources: Option<SourceDependencies>,
}

impl ResultCollectorProcessor {
    pub fn new(config: ResultCollectorConfig) -> Self {
        let sources = (!config.sources.is_empty())
            .then(|| SourceDependencies(config.sources.clone()));
        Self { config, sources }
    }

    pub fn json_merge(sources: &[&str]) -> Self {
        Self::new(ResultCollectorConfig {
            strategy: CollectionStrategy::JsonMerge,
            sources: sources.iter().map(|s| s.to_string()).collect(),
            separator: None,
        })
    }

    pub fn concatenate(sources: &[&str], separator: &str) -> Self {
        Self::new(ResultCollectorConfig {
            strategy: CollectionStrategy::Concatenate,
            sources: sources.iter().map(|s| s.to_string()).collect(),
            separator: Some(separator.to_string()),
        })
    }

    /// Names to collect, in the configured order; all stored names when unconfigured.
    fn selected(&self, values: &Values) -> Vec<String> {
        let keys = values.keys();
        match &self.sources {
            None => keys,
            Some(sources) => sources
                .0
                .iter()
                .flat_map(|pattern| {
                    keys.iter()
                        .filter(|key| SourceDependencies::matches(pattern, key))
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .collect(),
        }
    }

    fn collect(&self, values: &Values) -> anyhow::Result<String> {
        let selected: Vec<(String, Json)> = self
            .selected(values)
            .into_iter()
            .filter_map(|name| values.get_value(&name).map(|value| (name, to_json(&value))))
            .collect();

        match self.config.strategy {
            CollectionStrategy::FirstAvailable => selected
                .into_iter()
                .next()
                .map(|(_, value)| render(&value))
                .ok_or_else(|| anyhow::anyhow!("none of the configured sources has a value")),
            CollectionStrategy::Concatenate => {
                let separator = self.config.separator.as_deref().unwrap_or("\n");
                Ok(selected
                    .iter()
                    .map(|(_, value)| render(value))
                    .collect::<Vec<_>>()
                    .join(separator))
            }
            CollectionStrategy::JsonMerge => {
                let merged: Map<String, Json> = selected.into_iter().collect();
                Ok(serde_json::to_string_pretty(&Json::Object(merged))?)
            }
        }
    }
}

fn render(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON view of the stored value types the built-in processors produce.
fn to_json(value: &Value) -> Json {
    if let Some(s) = value.downcast_ref::<String>() {
        return json!(s);
    }
    if let Some(n) = value.downcast_ref::<i64>() {
        return json!(n);
    }
    if let Some(n) = value.downcast_ref::<f64>() {
        return json!(n);
    }
    if let Some(b) = value.downcast_ref::<bool>() {
        return json!(b);
    }
    if let Some(list) = value.downcast_ref::<Vec<String>>() {
        return json!(list);
    }
    if let Some(path) = value.downcast_ref::<PathBuf>() {
        return json!(path.display().to_string());
    }
    if let Some(map) = value.downcast_ref::<HashMap<String, String>>() {
        return json!(map);
    }
    if let Some(count) = value.downcast_ref::<TokenCount>() {
        return json!(count);
    }
    if let Some(frequencies) = value.downcast_ref::<WordFrequencies>() {
        return json!(frequencies);
    }
    Json::Null
}

#[async_trait]
impl Processor for ResultCollectorProcessor {
    async fn execute(
        &self,
        input: ProcessorInput,
        _context: &ExecutionContext,
    ) -> anyhow::Result<ProcessorOutput> {
        let values = input.values("values")?;
        Ok(ProcessorOutput::new().with("report", self.collect(&values)?))
    }

    fn name(&self) -> &str {
        "result_collector"
    }

    fn input_shape(&self) -> Option<InputShape> {
        Some(InputShape::new().whole_store("values"))
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::new().field::<String>("report")
    }

    fn custom_dependencies(&self) -> Option<&dyn CustomDependencies> {
        self.sources
            .as_ref()
            .map(|s| s as &dyn CustomDependencies)
    }
}
