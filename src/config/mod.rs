// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
pub mod registry;
mod runtime;

pub mod consts;

pub use loader::{
    load_config, load_values, parse_config, values_from_json, Config, DeclaredType,
    ExecutorOptions, ProcessorConfig,
};
pub use registry::{ProcessorFactory, ProcessorRegistry};
pub use runtime::{Runtime, RuntimeBuilder};
