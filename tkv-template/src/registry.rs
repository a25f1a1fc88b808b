//! # Operation Registry
//!
//! Purpose: Look typed operations up by key prefix.
//!
//! Handles are stored type-erased and recovered with a typed lookup, so one
//! registry can hold operations over unrelated key and value types. The first
//! registration for a prefix wins; there is no removal.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use tracing::debug;

use crate::serializer::{Serializer, TypedJsonSerializer};
use crate::string_ops::StringOperation;
use crate::zset_ops::ZSetOperation;

type Handle = Arc<dyn Any + Send + Sync>;

/// Prefix → operation map.
#[derive(Default)]
pub struct OperationRegistry {
    operations: HashMap<String, Handle>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `operation` under `prefix`.
    ///
    /// Returns `false`, leaving the existing entry in place, when the prefix
    /// is already taken.
    pub fn register<T>(&mut self, prefix: impl Into<String>, operation: T) -> bool
    where
        T: Any + Send + Sync,
    {
        let prefix = prefix.into();
        if self.operations.contains_key(&prefix) {
            debug!(%prefix, "prefix already registered; keeping the first operation");
            return false;
        }
        debug!(%prefix, operation = std::any::type_name::<T>(), "registered operation");
        self.operations.insert(prefix, Arc::new(operation));
        true
    }

    pub fn register_string<K, V, S>(&mut self, operation: StringOperation<K, V, S>) -> bool
    where
        K: Display + 'static,
        V: 'static,
        S: Serializer<V> + 'static,
    {
        let prefix = operation.prefix().to_string();
        self.register(prefix, operation)
    }

    pub fn register_zset<K, V, S>(&mut self, operation: ZSetOperation<K, V, S>) -> bool
    where
        K: Display + 'static,
        V: 'static,
        S: Serializer<V> + 'static,
    {
        let prefix = operation.prefix().to_string();
        self.register(prefix, operation)
    }

    /// The operation under `prefix`, if one was registered with type `T`.
    pub fn get<T>(&self, prefix: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let handle = self.operations.get(prefix)?;
        Arc::clone(handle).downcast::<T>().ok()
    }

    pub fn string<K, V, S>(&self, prefix: &str) -> Option<Arc<StringOperation<K, V, S>>>
    where
        K: Display + 'static,
        V: 'static,
        S: Serializer<V> + 'static,
    {
        self.get(prefix)
    }

    /// Shorthand for the default value codec.
    pub fn zset<K, V>(&self, prefix: &str) -> Option<Arc<ZSetOperation<K, V, TypedJsonSerializer>>>
    where
        K: Display + 'static,
        V: 'static,
        TypedJsonSerializer: Serializer<V>,
    {
        self.get(prefix)
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.operations.contains_key(prefix)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.operations.keys()).finish()
    }
}
