// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::{Any, TypeId};
use std::fmt;

use super::Value;

/// Declared type of an attribute, checked at graph build time and when inputs are populated.
///
/// `AttributeType::any()` plays the role of a top type: it accepts every other type.
/// Concrete types are only assignable from exactly the same Rust type.
#[derive(Clone, Copy)]
pub struct AttributeType {
    name: &'static str,
    id: Option<TypeId>,
}

impl AttributeType {
    pub fn of<T: Any>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            id: Some(TypeId::of::<T>()),
        }
    }

    pub const fn any() -> Self {
        Self {
            name: "any",
            id: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_any(&self) -> bool {
        self.id.is_none()
    }

    /// True when a value of type `other` may be bound to an input of this type.
    pub fn is_assignable_from(&self, other: &AttributeType) -> bool {
        match self.id {
            None => true,
            Some(id) => other.id == Some(id),
        }
    }

    pub fn accepts_value(&self, value: &Value) -> bool {
        match self.id {
            None => true,
            Some(id) => Any::type_id(&**value) == id,
        }
    }
}

impl PartialEq for AttributeType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AttributeType {}

impl fmt::Debug for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeType({})", self.name)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
