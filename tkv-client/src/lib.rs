//! # TypedKV Sync Client
//!
//! Purpose: Byte-oriented, synchronous client for a Redis-compatible store,
//! with a bounded session pool and one command trait per data-type family.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Reuse TCP sessions to avoid repeated connects
//!    and handshakes.
//! 2. **One Primitive, Many Families**: Every command family is a trait with
//!    provided methods over `RawCommands::exec`; `Connection` implements all.
//! 3. **Minimal Allocation**: Sessions reuse their buffers for RESP framing
//!    and parsing.
//! 4. **Protocol Clarity**: Encode/parse RESP2 explicitly for correctness.

pub mod commands;
mod config;
mod connection;
mod error;
mod factory;
mod pool;
mod resp;
mod session;

pub use commands::{
    HashCommands, KeyCommands, ListCommands, ListPosition, RawCommands, RawTuple,
    ScriptOutput, ScriptingCommands, SetCommands, StringCommands, ZSetCommands,
};
pub use config::{ClientConfiguration, PoolSettings, TlsSettings};
pub use connection::Connection;
pub use error::{ClientError, ClientResult};
pub use factory::ConnectionFactory;
pub use pool::{ConnectionPool, PooledSession};
pub use resp::RespValue;
pub use session::Session;
