//! # Command Families
//!
//! Purpose: Byte-oriented store commands grouped by data type. Every family
//! is a trait with provided methods layered on one primitive,
//! [`RawCommands::exec`], and `Connection` implements all of them.
//!
//! ## Design Principles
//! 1. **Composition over Inheritance**: Families are independent traits over
//!    a shared primitive instead of sibling wrapper objects.
//! 2. **Borrow-Friendly API**: Keys and values are taken as `&[u8]` (or
//!    `AsRef<[u8]>` for variadic arguments) to avoid copies.
//! 3. **Reply Shaping in One Place**: The `reply_*` helpers below map RESP
//!    replies to Rust types and reject shape mismatches uniformly.

mod hash;
mod key;
mod list;
mod scripting;
mod set;
mod string;
mod zset;

pub use hash::HashCommands;
pub use key::KeyCommands;
pub use list::{ListCommands, ListPosition};
pub use scripting::{ScriptOutput, ScriptingCommands};
pub use set::SetCommands;
pub use string::StringCommands;
pub use zset::{RawTuple, ZSetCommands};

use tkv_common::convert::{encode_f64, encode_i64, parse_f64};
use tkv_common::TkvResult;

use crate::error::{ClientError, ClientResult};
use crate::resp::RespValue;

/// The single primitive every command family is built on.
pub trait RawCommands {
    /// Sends one command and returns its reply. Error replies surface as
    /// `ClientError::Server`.
    fn exec<A: AsRef<[u8]>>(&mut self, args: &[A]) -> ClientResult<RespValue>;
}

/// Owned argument list for commands with optional or variadic parts.
#[derive(Debug, Clone, Default)]
pub(crate) struct Cmd {
    args: Vec<Vec<u8>>,
}

impl Cmd {
    pub(crate) fn new(name: &[u8]) -> Self {
        Cmd {
            args: vec![name.to_vec()],
        }
    }

    pub(crate) fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.args.push(arg.as_ref().to_vec());
        self
    }

    pub(crate) fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        self.args.extend(args.into_iter().map(|arg| arg.as_ref().to_vec()));
        self
    }

    pub(crate) fn int(self, value: i64) -> Self {
        self.arg(encode_i64(value))
    }

    pub(crate) fn float(self, value: f64) -> TkvResult<Self> {
        Ok(self.arg(encode_f64(value)?))
    }

    pub(crate) fn args_mut(&mut self) -> &mut Vec<Vec<u8>> {
        &mut self.args
    }

    pub(crate) fn run<C: RawCommands + ?Sized>(&self, conn: &mut C) -> ClientResult<RespValue> {
        conn.exec(&self.args)
    }
}

/// `+OK` → true; a null bulk (conditional write skipped) → false.
pub(crate) fn reply_ok(reply: RespValue) -> ClientResult<bool> {
    match reply {
        RespValue::Simple(text) => Ok(text == b"OK"),
        RespValue::Bulk(None) => Ok(false),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

/// Any simple-string reply, ignoring its text.
pub(crate) fn reply_status(reply: RespValue) -> ClientResult<()> {
    match reply {
        RespValue::Simple(_) => Ok(()),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

pub(crate) fn reply_integer(reply: RespValue) -> ClientResult<i64> {
    match reply {
        RespValue::Integer(value) => Ok(value),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

/// `:1` → true, `:0` → false.
pub(crate) fn reply_flag(reply: RespValue) -> ClientResult<bool> {
    reply_integer(reply).map(|value| value == 1)
}

/// Integer reply where null means "absent" (`ZRANK` on a missing member).
pub(crate) fn reply_optional_integer(reply: RespValue) -> ClientResult<Option<i64>> {
    match reply {
        RespValue::Integer(value) => Ok(Some(value)),
        RespValue::Bulk(None) | RespValue::Array(None) => Ok(None),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

pub(crate) fn reply_bulk(reply: RespValue) -> ClientResult<Option<Vec<u8>>> {
    match reply {
        RespValue::Bulk(data) => Ok(data),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

/// Bulk reply holding a score; null means "absent".
pub(crate) fn reply_double(reply: RespValue) -> ClientResult<Option<f64>> {
    match reply_bulk(reply)? {
        Some(data) => parse_f64(&data).map(Some).ok_or(ClientError::UnexpectedResponse),
        None => Ok(None),
    }
}

fn reply_items(reply: RespValue) -> ClientResult<Vec<RespValue>> {
    match reply {
        RespValue::Array(items) => Ok(items.unwrap_or_default()),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

/// Array of bulk strings where elements may be null (`MGET`, `HMGET`).
pub(crate) fn reply_bulk_list(reply: RespValue) -> ClientResult<Vec<Option<Vec<u8>>>> {
    reply_items(reply)?.into_iter().map(reply_bulk).collect()
}

/// Array of non-null bulk strings (members, keys, fields).
pub(crate) fn reply_bytes_list(reply: RespValue) -> ClientResult<Vec<Vec<u8>>> {
    reply_items(reply)?
        .into_iter()
        .map(|item| reply_bulk(item)?.ok_or(ClientError::UnexpectedResponse))
        .collect()
}

pub(crate) fn reply_array(reply: RespValue) -> ClientResult<Vec<RespValue>> {
    reply_items(reply)
}
