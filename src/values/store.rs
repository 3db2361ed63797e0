// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Value;
use crate::errors::ValuesError;

/// Thread-safe, string-keyed map of heterogeneous values.
///
/// `Values` is a cheap handle: clones share the same underlying map. One store is
/// created per job; concurrent branches of the job write disjoint keys.
///
/// ```
/// use report_graph::values::Values;
///
/// let values = Values::new();
/// values.put("dpi", 254_u32);
///
/// assert_eq!(*values.get::<u32>("dpi").unwrap(), 254);
/// assert!(values.get::<String>("dpi").is_err());
/// ```
#[derive(Clone, Default)]
pub struct Values {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Independent store seeded with every entry of this one.
    ///
    /// Used for repeated sections: each iteration gets its own overlay, writes to the
    /// child never reach the parent.
    pub fn child(&self) -> Values {
        let entries = self.read().clone();
        Values {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    pub fn put<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.put_value(key, Arc::new(value));
    }

    pub fn put_value(&self, key: impl Into<String>, value: Value) {
        self.write().insert(key.into(), value);
    }

    /// Typed lookup; fails with every available key listed when absent or mistyped.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, ValuesError> {
        let value = self.get_value(key).ok_or_else(|| ValuesError::NotFound {
            key: key.to_string(),
            available: self.keys(),
        })?;

        value.downcast::<T>().map_err(|_| ValuesError::WrongType {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
            available: self.keys(),
        })
    }

    pub fn get_cloned<T: Any + Send + Sync + Clone>(&self, key: &str) -> Result<T, ValuesError> {
        self.get::<T>(key).map(|value| (*value).clone())
    }

    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.write().remove(key)
    }

    /// Sorted snapshot of the current keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A writer panicking mid-insert cannot leave the map itself inconsistent,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("keys", &self.keys()).finish()
    }
}
