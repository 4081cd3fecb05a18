//! Shared state threaded through a single execution.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;

use crate::domain::error::{DomainError, DomainResult};

type Value = Box<dyn Any + Send + Sync>;

/// String-keyed map of arbitrary values.
///
/// One instance is created per top-level run and handed to every action by
/// mutable reference. Values are stored type-erased and read back with the
/// typed accessors.
#[derive(Default)]
pub struct State {
    values: HashMap<String, Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing whatever was stored under `key`.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    /// Like [`State::get`], but reports why the value is unavailable.
    pub fn require<T: Any>(&self, key: &str) -> DomainResult<&T> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| DomainError::MissingKey(key.to_string()))?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| DomainError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Like [`State::get_mut`], but reports why the value is unavailable.
    pub fn require_mut<T: Any>(&mut self, key: &str) -> DomainResult<&mut T> {
        let value = self
            .values
            .get_mut(key)
            .ok_or_else(|| DomainError::MissingKey(key.to_string()))?;
        value
            .downcast_mut::<T>()
            .ok_or_else(|| DomainError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Remove `key`, returning true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State").field("keys", &self.keys()).finish()
    }
}
