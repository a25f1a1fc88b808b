//! # TypedKV Template
//!
//! Purpose: Typed, prefix-namespaced operations over the byte client: typed
//! keys and values in, typed results (or an explicit default) out.
//!
//! ## Design Principles
//! 1. **Encode, Execute, Decode**: Every operation encodes its arguments,
//!    runs one command through `Template::execute` and decodes the reply.
//! 2. **Defaults Are Visible**: Store failures never panic or propagate; they
//!    come back as `Executed::Defaulted` with the reason attached.
//! 3. **Compile-Time Types**: Key, value and codec are type parameters, and
//!    the registry recovers them with typed lookups.
//! 4. **No Globals**: `KvContext` owns the factory and registry.

mod context;
mod error;
mod key_ops;
mod operation;
mod registry;
mod serializer;
mod string_ops;
mod template;
mod zset_ops;

pub use context::KvContext;
pub use error::{OpError, OpResult, SerializationError};
pub use key_ops::KeyOperations;
pub use operation::Operation;
pub use registry::OperationRegistry;
pub use serializer::{JsonSerializer, Serializer, StringSerializer, TypedJsonSerializer};
pub use string_ops::StringOperation;
pub use template::{Executed, Fallback, Template};
pub use zset_ops::ZSetOperation;

pub use tkv_client::{ClientConfiguration, ClientError, ClientResult, PoolSettings};
pub use tkv_common::{
    Aggregate, Boundary, BoundaryValue, DataType, Expiration, KeyTtl, Limit, ScoreRange, SetOption,
    TkvError, TypedTuple, Weights, ZAddOption,
};
