// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // processor implementations
pub mod config;        // pipeline files + registry
pub mod engine;        // fork/join scheduler
pub mod errors;        // error handling
pub mod graph;         // graph construction
pub mod observability;
pub mod traits;        // processor abstractions
pub mod values;        // values store
