// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared data pool passed between processors of one job.
//!
//! Processors never talk to each other directly. Each node reads its inputs from a
//! [`Values`] store by name and writes its outputs back under their resolved names;
//! the graph builder guarantees that a value is written before anything that needs
//! it is allowed to start.

mod attribute_type;
mod store;

use std::any::Any;
use std::sync::Arc;

pub use attribute_type::AttributeType;
pub use store::Values;

/// An untyped value held in the store.
pub type Value = Arc<dyn Any + Send + Sync>;
