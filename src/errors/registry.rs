// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for pipeline configuration loading and processor instantiation.

use std::path::PathBuf;
use thiserror::Error;

use super::BuildErrors;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pipeline configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON values: {0}")]
    Json(#[from] serde_json::Error),

    /// No factory is registered under the configured processor type
    #[error("Unknown processor type '{kind}'; available types: [{}]", .available.join(", "))]
    UnknownProcessor { kind: String, available: Vec<String> },

    #[error("Invalid options for processor '{kind}': {reason}")]
    InvalidOptions { kind: String, reason: String },

    /// An initial value could not be coerced to its declared attribute type
    #[error("Value for attribute '{attribute}' is not a valid {expected}")]
    InvalidValue { attribute: String, expected: String },

    #[error(transparent)]
    Build(#[from] BuildErrors),
}
