//! Attribute resolution: the store names a processor reads and writes.
//!
//! For each declared field the effective name is, in order of precedence:
//!
//! 1. the explicit mapping entry, used verbatim;
//! 2. `prefix + Capitalize(field)` when a prefix is configured and the field is not ambient;
//! 3. the field name itself.

use std::collections::HashMap;

use crate::config::consts::AMBIENT_ATTRIBUTES;
use crate::errors::{BuildError, MappingDirection};
use crate::traits::{InputKind, Processor};
use crate::values::AttributeType;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInput {
    pub field: String,
    pub name: String,
    pub kind: InputKind,
    pub has_default: bool,
    pub in_place: bool,
}

impl ResolvedInput {
    pub fn is_whole_store(&self) -> bool {
        self.kind == InputKind::WholeStore
    }

    pub fn attribute_type(&self) -> Option<AttributeType> {
        match self.kind {
            InputKind::Typed(ty) => Some(ty),
            InputKind::WholeStore => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOutput {
    pub field: String,
    pub name: String,
    pub ty: AttributeType,
    pub renamable: bool,
}

pub fn is_ambient(name: &str) -> bool {
    AMBIENT_ATTRIBUTES.contains(&name)
}

pub fn resolve_name(
    field: &str,
    mapper: Option<&HashMap<String, String>>,
    prefix: Option<&str>,
) -> String {
    if let Some(mapped) = mapper.and_then(|m| m.get(field)) {
        return mapped.clone();
    }
    match prefix {
        Some(prefix) if !prefix.is_empty() && !is_ambient(field) => {
            format!("{}{}", prefix, capitalize(field))
        }
        _ => field.to_string(),
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Resolves the input fields of `processor`, labelled `label` in error reports.
pub fn resolve_inputs(
    processor: &dyn Processor,
    label: &str,
) -> Result<Vec<ResolvedInput>, Vec<BuildError>> {
    let shape = processor.input_shape().unwrap_or_default();
    let mapper = processor.input_mapper();

    let errors = validate_mapper(label, MappingDirection::Input, mapper, &shape.field_names());
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(shape
        .fields()
        .iter()
        .map(|field| ResolvedInput {
            field: field.name.clone(),
            name: resolve_name(&field.name, mapper, processor.input_prefix()),
            kind: field.kind,
            has_default: field.has_default,
            in_place: field.in_place,
        })
        .collect())
}

/// Resolves the output fields of `processor`, labelled `label` in error reports.
pub fn resolve_outputs(
    processor: &dyn Processor,
    label: &str,
) -> Result<Vec<ResolvedOutput>, Vec<BuildError>> {
    let shape = processor.output_shape();
    let mapper = processor.output_mapper();

    let errors = validate_mapper(label, MappingDirection::Output, mapper, &shape.field_names());
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(shape
        .fields()
        .iter()
        .map(|field| ResolvedOutput {
            field: field.name.clone(),
            name: resolve_name(&field.name, mapper, processor.output_prefix()),
            ty: field.ty,
            renamable: field.renamable,
        })
        .collect())
}

fn validate_mapper(
    label: &str,
    direction: MappingDirection,
    mapper: Option<&HashMap<String, String>>,
    valid_fields: &[&str],
) -> Vec<BuildError> {
    let Some(mapper) = mapper else {
        return Vec::new();
    };

    let mut unknown: Vec<&String> = mapper
        .keys()
        .filter(|key| !valid_fields.contains(&key.as_str()))
        .collect();
    unknown.sort();

    unknown
        .into_iter()
        .map(|field| BuildError::InvalidMapping {
            processor: label.to_string(),
            direction,
            field: field.clone(),
            valid_fields: valid_fields.iter().map(|f| f.to_string()).collect(),
        })
        .collect()
}
