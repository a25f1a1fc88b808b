//! # Value Serializers
//!
//! Purpose: Convert typed keys and values to the byte strings the store
//! keeps, and back.
//!
//! ## Design Principles
//! 1. **Strategy Pattern**: Operations are generic over a `Serializer<V>` so
//!    the codec is picked at compile time.
//! 2. **Self-Describing Default**: `TypedJsonSerializer` records the Rust type
//!    name next to the JSON document and refuses to decode a payload written
//!    for another type.

use std::any::type_name;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SerializationError;

/// Two-way codec between `T` and bytes.
pub trait Serializer<T>: Send + Sync {
    fn serialize(&self, value: &T) -> Result<Vec<u8>, SerializationError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<T, SerializationError>;
}

/// UTF-8 text codec. Also used for every composed key.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl StringSerializer {
    /// Infallible encoding for borrowed text.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }
}

impl Serializer<String> for StringSerializer {
    fn serialize(&self, value: &String) -> Result<Vec<u8>, SerializationError> {
        Ok(self.encode(value))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<String, SerializationError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// Plain JSON documents, no type information.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl<T> Serializer<T> for JsonSerializer
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &T) -> Result<Vec<u8>, SerializationError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T, SerializationError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// JSON wrapped as `{"@type": "<rust type>", "value": <document>}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedJsonSerializer;

#[derive(Serialize)]
struct TaggedRef<'a, T> {
    #[serde(rename = "@type")]
    type_tag: &'a str,
    value: &'a T,
}

#[derive(Deserialize)]
struct Tagged {
    #[serde(rename = "@type")]
    type_tag: String,
    value: serde_json::Value,
}

impl<T> Serializer<T> for TypedJsonSerializer
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &T) -> Result<Vec<u8>, SerializationError> {
        let tagged = TaggedRef {
            type_tag: type_name::<T>(),
            value,
        };
        Ok(serde_json::to_vec(&tagged)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T, SerializationError> {
        let tagged: Tagged = serde_json::from_slice(bytes)?;
        let expected = type_name::<T>();
        if tagged.type_tag != expected {
            return Err(SerializationError::TypeMismatch {
                expected: expected.to_string(),
                found: tagged.type_tag,
            });
        }
        Ok(serde_json::from_value(tagged.value)?)
    }
}
