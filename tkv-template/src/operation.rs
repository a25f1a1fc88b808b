//! # Operation Base
//!
//! Purpose: Everything typed operations share: the key prefix, the template
//! they execute through, and the value codec.
//!
//! ## Design Principles
//! 1. **Namespacing by Prefix**: A key `k` is stored as `"{prefix}_{k}"`.
//!    Prefixes are not escaped, so prefix `a_b` with key `c` and prefix `a`
//!    with key `b_c` address the same entry.
//! 2. **Raw Bytes Pass Through**: When `V` is `Vec<u8>` values are stored
//!    and returned untouched, whatever the serializer.
//! 3. **Monomorphic Codecs**: The serializer is a type parameter, not a
//!    trait object.

use std::any::Any;
use std::fmt::{self, Display};
use std::marker::PhantomData;

use crate::error::SerializationError;
use crate::serializer::{Serializer, StringSerializer, TypedJsonSerializer};
use crate::template::Template;

/// Shared state of a typed operation over keys `K` and values `V`.
pub struct Operation<K, V, S = TypedJsonSerializer> {
    prefix: String,
    template: Template,
    serializer: S,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V, S> Operation<K, V, S>
where
    K: Display,
    V: 'static,
    S: Serializer<V>,
{
    pub fn new(prefix: impl Into<String>, template: Template, serializer: S) -> Self {
        Operation {
            prefix: prefix.into(),
            template,
            serializer,
            _types: PhantomData,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    /// The namespaced key text, `"{prefix}_{key}"`.
    pub fn make_key(&self, key: &K) -> String {
        format!("{}_{}", self.prefix, key)
    }

    pub fn raw_key(&self, key: &K) -> Vec<u8> {
        StringSerializer.encode(&self.make_key(key))
    }

    pub fn raw_keys<'a, I>(&self, keys: I) -> Vec<Vec<u8>>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        keys.into_iter().map(|key| self.raw_key(key)).collect()
    }

    pub fn raw_value(&self, value: &V) -> Result<Vec<u8>, SerializationError> {
        if let Some(bytes) = (value as &dyn Any).downcast_ref::<Vec<u8>>() {
            return Ok(bytes.clone());
        }
        self.serializer.serialize(value)
    }

    pub fn raw_values<'a, I>(&self, values: I) -> Result<Vec<Vec<u8>>, SerializationError>
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        values.into_iter().map(|value| self.raw_value(value)).collect()
    }

    pub fn decode_value(&self, bytes: Vec<u8>) -> Result<V, SerializationError> {
        let mut raw = Some(bytes);
        if let Some(value) = (&mut raw as &mut dyn Any)
            .downcast_mut::<Option<V>>()
            .and_then(Option::take)
        {
            return Ok(value);
        }
        self.serializer.deserialize(raw.as_deref().unwrap_or_default())
    }

    pub fn decode_values(&self, raw: Vec<Vec<u8>>) -> Result<Vec<V>, SerializationError> {
        raw.into_iter().map(|bytes| self.decode_value(bytes)).collect()
    }

    /// Decodes an optional reply; `None` stays `None`.
    pub fn decode_optional(&self, bytes: Option<Vec<u8>>) -> Result<Option<V>, SerializationError> {
        bytes.map(|bytes| self.decode_value(bytes)).transpose()
    }
}

impl<K, V, S: Clone> Clone for Operation<K, V, S> {
    fn clone(&self) -> Self {
        Operation {
            prefix: self.prefix.clone(),
            template: self.template.clone(),
            serializer: self.serializer.clone(),
            _types: PhantomData,
        }
    }
}

impl<K, V, S> fmt::Debug for Operation<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("prefix", &self.prefix)
            .field("key", &std::any::type_name::<K>())
            .field("value", &std::any::type_name::<V>())
            .finish()
    }
}
