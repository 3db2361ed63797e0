// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Processor implementations.
//!
//! * `local` - built-in in-process text processors and their factory
//! * `configured` - wrapper applying configured mappers and prefixes to any processor
//! * `stub` - configurable processors for tests (test builds only)

pub mod configured;
pub mod local;
#[cfg(test)]
pub mod stub;
