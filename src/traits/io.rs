use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ValuesError;
use crate::values::{Value, Values};

/// Input handed to a processor: its declared fields, populated from the values store.
///
/// Fields are addressed by *field* name, never by store name, so a processor is
/// unaffected by mappings and prefixes applied in configuration.
#[derive(Clone, Default)]
pub struct ProcessorInput {
    fields: HashMap<String, Value>,
}

impl ProcessorInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn with<T: Any + Send + Sync>(mut self, field: &str, value: T) -> Self {
        self.insert(field, Arc::new(value));
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get<T: Any + Send + Sync>(&self, field: &str) -> Result<Arc<T>, ValuesError> {
        self.get_optional::<T>(field)?
            .ok_or_else(|| ValuesError::NotFound {
                key: field.to_string(),
                available: self.field_names(),
            })
    }

    /// `Ok(None)` for an absent field; a present field of another type is still an error.
    pub fn get_optional<T: Any + Send + Sync>(
        &self,
        field: &str,
    ) -> Result<Option<Arc<T>>, ValuesError> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(value) => value.clone().downcast::<T>().map(Some).map_err(|_| {
                ValuesError::WrongType {
                    key: field.to_string(),
                    expected: std::any::type_name::<T>(),
                    available: self.field_names(),
                }
            }),
        }
    }

    pub fn get_cloned<T: Any + Send + Sync + Clone>(&self, field: &str) -> Result<T, ValuesError> {
        self.get::<T>(field).map(|value| (*value).clone())
    }

    /// The store bound to a whole-store field.
    pub fn values(&self, field: &str) -> Result<Values, ValuesError> {
        self.get_cloned::<Values>(field)
    }

    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Output returned by a processor, keyed by field name.
///
/// A field set to `None`, or a declared field left out entirely, removes any
/// value currently stored under the field's resolved name.
#[derive(Clone, Default)]
pub struct ProcessorOutput {
    fields: HashMap<String, Option<Value>>,
}

impl ProcessorOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Any + Send + Sync>(&mut self, field: impl Into<String>, value: T) {
        self.fields.insert(field.into(), Some(Arc::new(value)));
    }

    pub fn put_none(&mut self, field: impl Into<String>) {
        self.fields.insert(field.into(), None);
    }

    pub fn with<T: Any + Send + Sync>(mut self, field: &str, value: T) -> Self {
        self.put(field, value);
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Removes the field; the outer `Option` tells whether it was set at all.
    pub fn take(&mut self, field: &str) -> Option<Option<Value>> {
        self.fields.remove(field)
    }

    pub fn get<T: Any + Send + Sync>(&self, field: &str) -> Option<Arc<T>> {
        self.fields
            .get(field)
            .cloned()
            .flatten()
            .and_then(|value| value.downcast::<T>().ok())
    }
}
