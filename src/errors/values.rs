// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Lookup failures on the shared values store.
///
/// Both variants carry the keys that were available at the time of the lookup;
/// a mistyped attribute name is by far the most common cause.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuesError {
    #[error("No value named '{key}'; available values: [{}]", .available.join(", "))]
    NotFound { key: String, available: Vec<String> },

    #[error("Value '{key}' is not a {expected}; available values: [{}]", .available.join(", "))]
    WrongType {
        key: String,
        expected: &'static str,
        available: Vec<String>,
    },
}
