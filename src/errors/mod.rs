// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod registry;
mod values;

pub use config::{BuildError, BuildErrors, MappingDirection};
pub use execution::ExecutionError;
pub use registry::ConfigError;
pub use values::ValuesError;
