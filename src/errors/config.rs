// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Which mapping table an [`BuildError::InvalidMapping`] was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingDirection {
    Input,
    Output,
}

impl fmt::Display for MappingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingDirection::Input => write!(f, "input"),
            MappingDirection::Output => write!(f, "output"),
        }
    }
}

/// Errors that can occur while building a processor graph from an ordered processor list.
///
/// Processors are identified by their node label (`name#index`) so that two configured
/// instances of the same processor type can be told apart in the report.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// A processor requires an attribute that nothing produces and that has no default
    MissingRequiredInput {
        processor: String,
        attribute: String,
    },
    /// The producer's output type cannot be assigned to the consumer's input type
    TypeConflict {
        /// The consuming processor
        processor: String,
        /// The processor (or initial attribute table) providing the value
        provider: String,
        attribute: String,
        expected: String,
        actual: String,
    },
    /// Two processors (or a processor and an initial attribute) publish the same name
    DuplicateOutput {
        processor: String,
        provider: String,
        attribute: String,
    },
    /// A processor is not reachable from any root of the built graph
    OrphanProcessor {
        processor: String,
    },
    /// A mapping table references a field the processor does not declare
    InvalidMapping {
        processor: String,
        direction: MappingDirection,
        field: String,
        valid_fields: Vec<String>,
    },
    /// A circular dependency was detected in the processor graph
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingRequiredInput {
                processor,
                attribute,
            } => {
                write!(
                    f,
                    "Processor '{}' requires '{}' but no processor or attribute provides it",
                    processor, attribute
                )
            }
            BuildError::TypeConflict {
                processor,
                provider,
                attribute,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Type conflict on '{}': processor '{}' expects {} but '{}' provides {}",
                    attribute, processor, expected, provider, actual
                )
            }
            BuildError::DuplicateOutput {
                processor,
                provider,
                attribute,
            } => {
                write!(
                    f,
                    "Processor '{}' outputs '{}' which is already provided by '{}'",
                    processor, attribute, provider
                )
            }
            BuildError::OrphanProcessor { processor } => {
                write!(f, "Processor '{}' is not reachable from any root", processor)
            }
            BuildError::InvalidMapping {
                processor,
                direction,
                field,
                valid_fields,
            } => {
                write!(
                    f,
                    "Processor '{}' has an {} mapping for '{}' which is not one of its fields: [{}]",
                    processor,
                    direction,
                    field,
                    valid_fields.join(", ")
                )
            }
            BuildError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
        }
    }
}

impl BuildError {
    /// Short machine-readable name of the error variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            BuildError::MissingRequiredInput { .. } => "missing_required_input",
            BuildError::TypeConflict { .. } => "type_conflict",
            BuildError::DuplicateOutput { .. } => "duplicate_output",
            BuildError::OrphanProcessor { .. } => "orphan_processor",
            BuildError::InvalidMapping { .. } => "invalid_mapping",
            BuildError::CyclicDependency { .. } => "cyclic_dependency",
        }
    }
}

impl std::error::Error for BuildError {}

/// Every error found while building one pipeline configuration.
///
/// The graph builder keeps going after a bad processor so the whole configuration
/// can be fixed in one pass; this report is what it hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildErrors(pub Vec<BuildError>);

impl BuildErrors {
    pub fn iter(&self) -> impl Iterator<Item = &BuildError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<BuildError> {
        self.0
    }
}

impl fmt::Display for BuildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Processor graph configuration failed:")?;
        for error in &self.0 {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildErrors {}

impl From<Vec<BuildError>> for BuildErrors {
    fn from(errors: Vec<BuildError>) -> Self {
        Self(errors)
    }
}
