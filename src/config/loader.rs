// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::consts::{JOB_DIRECTORY, MDC_CONTEXT, REQUEST_HEADERS};
use crate::errors::ConfigError;
use crate::values::{AttributeType, Value, Values};

/// A pipeline configuration.
///
/// Processors are listed in configuration order, which is the order the graph
/// builder wires them in. They never reference each other; dependencies are
/// inferred from attribute names.
///
/// # Example
/// ```yaml
/// executor_options:
///   max_concurrency: 4
/// attributes:
///   text: string
/// processors:
///   - type: change_text_case
///     options:
///       case: upper
///   - type: token_counter
///     input_mapper:
///       text: changedText
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    /// Template attributes available to every job, with their declared types
    #[serde(default)]
    pub attributes: BTreeMap<String, DeclaredType>,
    pub processors: Vec<ProcessorConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutorOptions {
    /// Defaults to the number of CPU cores
    pub max_concurrency: Option<usize>,
}

/// Configuration for a single processor.
///
/// # Example
/// ```yaml
/// type: prefix_suffix_adder
/// input_prefix: legend
/// output_mapper:
///   decoratedText: legendTitle
/// options:
///   prefix: "["
///   suffix: "]"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Name the processor factory is registered under
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub input_mapper: Option<HashMap<String, String>>,
    #[serde(default)]
    pub output_mapper: Option<HashMap<String, String>>,
    #[serde(default)]
    pub input_prefix: Option<String>,
    #[serde(default)]
    pub output_prefix: Option<String>,
    /// Processor-specific options
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>,
}

/// Attribute types that can be declared in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredType {
    String,
    Integer,
    Float,
    Boolean,
    /// A list of strings
    Strings,
    Any,
}

impl DeclaredType {
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            DeclaredType::String => AttributeType::of::<String>(),
            DeclaredType::Integer => AttributeType::of::<i64>(),
            DeclaredType::Float => AttributeType::of::<f64>(),
            DeclaredType::Boolean => AttributeType::of::<bool>(),
            DeclaredType::Strings => AttributeType::of::<Vec<String>>(),
            DeclaredType::Any => AttributeType::any(),
        }
    }

    /// Coerces a JSON value to the Rust type this declaration stands for.
    ///
    /// `Any` keeps strings, numbers and booleans as their natural Rust types and
    /// stores everything else as a `serde_json::Value`.
    pub fn value_from_json(
        &self,
        attribute: &str,
        json: &serde_json::Value,
    ) -> Result<Value, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            attribute: attribute.to_string(),
            expected: format!("{:?}", self).to_lowercase(),
        };

        let value: Value = match self {
            DeclaredType::String => Arc::new(json.as_str().ok_or_else(invalid)?.to_string()),
            DeclaredType::Integer => Arc::new(json.as_i64().ok_or_else(invalid)?),
            DeclaredType::Float => Arc::new(json.as_f64().ok_or_else(invalid)?),
            DeclaredType::Boolean => Arc::new(json.as_bool().ok_or_else(invalid)?),
            DeclaredType::Strings => Arc::new(
                serde_json::from_value::<Vec<String>>(json.clone()).map_err(|_| invalid())?,
            ),
            DeclaredType::Any => match json {
                serde_json::Value::String(s) => Arc::new(s.clone()),
                serde_json::Value::Bool(b) => Arc::new(*b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => Arc::new(i),
                    None => Arc::new(n.as_f64().ok_or_else(invalid)?),
                },
                other => Arc::new(other.clone()),
            },
        };
        Ok(value)
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load the initial values of one job from a JSON object file.
pub fn load_values<P: AsRef<Path>>(path: P, config: &Config) -> Result<Values, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    values_from_json(&json, &config.attributes)
}

/// Builds a values store from a JSON object, coercing each entry by its declared type.
///
/// Ambient attributes get the Rust types the graph builder declares for them;
/// undeclared entries are treated as `any`.
pub fn values_from_json(
    json: &serde_json::Value,
    attributes: &BTreeMap<String, DeclaredType>,
) -> Result<Values, ConfigError> {
    let object = json.as_object().ok_or_else(|| ConfigError::InvalidValue {
        attribute: "<root>".to_string(),
        expected: "object".to_string(),
    })?;

    let values = Values::new();
    for (name, entry) in object {
        let value = match name.as_str() {
            JOB_DIRECTORY => {
                let path = entry.as_str().ok_or_else(|| ConfigError::InvalidValue {
                    attribute: name.clone(),
                    expected: "path".to_string(),
                })?;
                Arc::new(PathBuf::from(path)) as Value
            }
            MDC_CONTEXT | REQUEST_HEADERS => {
                let map: HashMap<String, String> = serde_json::from_value(entry.clone())
                    .map_err(|_| ConfigError::InvalidValue {
                        attribute: name.clone(),
                        expected: "string map".to_string(),
                    })?;
                Arc::new(map) as Value
            }
            _ => attributes
                .get(name)
                .copied()
                .unwrap_or(DeclaredType::Any)
                .value_from_json(name, entry)?,
        };
        values.put_value(name.clone(), value);
    }
    Ok(values)
}
