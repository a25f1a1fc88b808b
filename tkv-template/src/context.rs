//! # Context
//!
//! Purpose: Own the connection factory, the shared template and the
//! operation registry for one store.
//!
//! ## Design Principles
//! 1. **Explicit Lifecycle**: `init` connects the pool, `shutdown` closes it.
//!    Nothing is global; pass the context (or clones of its template) to
//!    whoever needs it.
//! 2. **Register Before Use**: Registration takes `&mut self`, lookups take
//!    `&self`, so registrations finish before the context is shared.

use std::fmt::Display;
use std::sync::Arc;

use tracing::info;

use tkv_client::{ClientConfiguration, ClientResult, ConnectionFactory};

use crate::registry::OperationRegistry;
use crate::serializer::{Serializer, TypedJsonSerializer};
use crate::string_ops::StringOperation;
use crate::template::Template;
use crate::zset_ops::ZSetOperation;

/// Entry point of the typed layer.
#[derive(Debug)]
pub struct KvContext {
    template: Template,
    registry: OperationRegistry,
}

impl KvContext {
    /// Builds the factory from `config`, initializes its pool and wraps it in
    /// a template.
    pub fn init(config: ClientConfiguration) -> ClientResult<Self> {
        let mut factory = ConnectionFactory::new(config);
        factory.init()?;
        info!(address = %factory.config().address(), "typed context ready");
        Ok(KvContext {
            template: Template::new(factory),
            registry: OperationRegistry::new(),
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut OperationRegistry {
        &mut self.registry
    }

    /// Creates a string operation under `prefix` and registers it. Returns
    /// `false` when the prefix was already taken.
    pub fn register_string<K, V, S>(&mut self, prefix: &str) -> bool
    where
        K: Display + 'static,
        V: 'static,
        S: Serializer<V> + Default + 'static,
    {
        let operation: StringOperation<K, V, S> = StringOperation::new(prefix, self.template.clone());
        self.registry.register_string(operation)
    }

    pub fn register_zset<K, V, S>(&mut self, prefix: &str) -> bool
    where
        K: Display + 'static,
        V: 'static,
        S: Serializer<V> + Default + 'static,
    {
        let operation: ZSetOperation<K, V, S> = ZSetOperation::new(prefix, self.template.clone());
        self.registry.register_zset(operation)
    }

    pub fn string<K, V, S>(&self, prefix: &str) -> Option<Arc<StringOperation<K, V, S>>>
    where
        K: Display + 'static,
        V: 'static,
        S: Serializer<V> + 'static,
    {
        self.registry.string(prefix)
    }

    pub fn zset<K, V>(&self, prefix: &str) -> Option<Arc<ZSetOperation<K, V, TypedJsonSerializer>>>
    where
        K: Display + 'static,
        V: 'static,
        TypedJsonSerializer: Serializer<V>,
    {
        self.registry.zset(prefix)
    }

    /// Closes the pool. Operations still held elsewhere keep their template
    /// but every later call defaults with `ClientError::Closed`.
    pub fn shutdown(self) {
        if let Some(pool) = self.template.factory().pool() {
            pool.close();
        }
        info!(operations = self.registry.len(), "typed context shut down");
    }
}
