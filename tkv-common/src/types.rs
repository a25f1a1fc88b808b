//! # Shared Type Definitions
//!
//! Small value types exchanged between the byte-level client and the typed
//! operation layer.
//!
//! ## Design Principles
//!
//! 1. **Closed Enums**: Command options are enums, never free-form strings,
//!    so an invalid flag cannot be expressed.
//! 2. **Wire Names in One Place**: Each enum knows its own wire token.
//! 3. **Score-Ordered Tuples**: `TypedTuple` orders by score using
//!    `f64::total_cmp`, so sorting never panics on odd floats.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::TkvError;

/// Immutable (value, score) pair returned by `WITHSCORES` range commands.
#[derive(Debug, Clone)]
pub struct TypedTuple<V> {
    value: V,
    score: f64,
}

impl<V> TypedTuple<V> {
    pub fn new(value: V, score: f64) -> Self {
        TypedTuple { value, score }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn into_parts(self) -> (V, f64) {
        (self.value, self.score)
    }

    /// Score-only comparator, usable for any `V`.
    pub fn by_score(a: &Self, b: &Self) -> Ordering {
        a.score.total_cmp(&b.score)
    }
}

// Scores compare with `total_cmp`, so `0.0` and `-0.0` differ here as in `Ord`.
impl<V: PartialEq> PartialEq for TypedTuple<V> {
    fn eq(&self, other: &Self) -> bool {
        TypedTuple::by_score(self, other) == Ordering::Equal && self.value == other.value
    }
}

impl<V: Eq> Eq for TypedTuple<V> {}

impl<V: Ord> PartialOrd for TypedTuple<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Score decides; the value only breaks ties so Ord stays consistent with Eq.
impl<V: Ord> Ord for TypedTuple<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        TypedTuple::by_score(self, other).then_with(|| self.value.cmp(&other.value))
    }
}

/// Data type reported by the `TYPE` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    None,
    String,
    List,
    Set,
    ZSet,
    Hash,
}

impl DataType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataType::None => "none",
            DataType::String => "string",
            DataType::List => "list",
            DataType::Set => "set",
            DataType::ZSet => "zset",
            DataType::Hash => "hash",
        }
    }
}

impl FromStr for DataType {
    type Err = TkvError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "none" => Ok(DataType::None),
            "string" => Ok(DataType::String),
            "list" => Ok(DataType::List),
            "set" => Ok(DataType::Set),
            "zset" => Ok(DataType::ZSet),
            "hash" => Ok(DataType::Hash),
            other => Err(TkvError::UnknownDataType(other.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conditional write flag for `SET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SetOption {
    #[default]
    None,
    /// `NX`
    IfAbsent,
    /// `XX`
    IfPresent,
}

impl SetOption {
    pub const fn token(&self) -> Option<&'static [u8]> {
        match self {
            SetOption::None => None,
            SetOption::IfAbsent => Some(b"NX"),
            SetOption::IfPresent => Some(b"XX"),
        }
    }
}

/// Flag for `ZADD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZAddOption {
    /// `NX`
    IfAbsent,
    /// `XX`
    IfPresent,
    /// `CH`: count changed elements, not only added ones.
    Changed,
}

impl ZAddOption {
    pub const fn token(&self) -> &'static [u8] {
        match self {
            ZAddOption::IfAbsent => b"NX",
            ZAddOption::IfPresent => b"XX",
            ZAddOption::Changed => b"CH",
        }
    }
}

/// Expected shape of a script reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Boolean,
    Integer,
    Multi,
    Status,
    Value,
}

/// TTL state of a key, mirroring the store's `-2` / `-1` / `n` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// Key is missing or already expired.
    Missing,
    /// Key exists without expiration.
    NoExpiry,
    /// Key expires after the provided duration.
    ExpiresIn(Duration),
}

impl KeyTtl {
    /// Interprets a `TTL` (seconds) reply.
    pub fn from_seconds(reply: i64) -> Option<Self> {
        match reply {
            -2 => Some(KeyTtl::Missing),
            -1 => Some(KeyTtl::NoExpiry),
            value if value >= 0 => Some(KeyTtl::ExpiresIn(Duration::from_secs(value as u64))),
            _ => None,
        }
    }

    /// Interprets a `PTTL` (milliseconds) reply.
    pub fn from_millis(reply: i64) -> Option<Self> {
        match reply {
            -2 => Some(KeyTtl::Missing),
            -1 => Some(KeyTtl::NoExpiry),
            value if value >= 0 => Some(KeyTtl::ExpiresIn(Duration::from_millis(value as u64))),
            _ => None,
        }
    }
}
