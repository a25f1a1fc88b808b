//! # Score Ranges, Boundaries and Limits
//!
//! Purpose: Describe the `min`/`max` arguments and the optional `LIMIT`
//! clause of sorted-set range commands, and encode them to wire bytes.
//!
//! ## Design Principles
//! 1. **Independent Sides**: Each boundary encodes on its own; an absent or
//!    infinite boundary falls back to the side's "no limit" token.
//! 2. **Closed Value Set**: Boundary values are an enum rather than an
//!    untyped object, so unsupported types cannot reach the encoder.
//! 3. **Explicit Unlimited**: `Limit::Unlimited` is a distinct variant and
//!    never turns into a zero or negative count on the wire.
//!
//! ## Encoding Table
//!
//! ```text
//! boundary          score form     lex form
//! ---------------   ----------     --------
//! absent (min)      -inf           -
//! absent (max)      +inf           +
//! inclusive v       v              [v
//! exclusive v       (v             (v
//! ```

use crate::convert::{
    encode_f64, encode_i64, EXCLUSIVE_PREFIX, LEX_INCLUSIVE_PREFIX, LEX_MAX_BYTES, LEX_MIN_BYTES,
    NEGATIVE_INFINITY_BYTES, POSITIVE_INFINITY_BYTES,
};
use crate::error::TkvResult;

/// Value carried by a [`Boundary`].
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryValue {
    Bytes(Vec<u8>),
    Double(f64),
    Long(i64),
    Integer(i32),
    Text(String),
}

impl BoundaryValue {
    /// Encodes the bare value without any inclusive/exclusive marker.
    pub fn to_bytes(&self) -> TkvResult<Vec<u8>> {
        match self {
            BoundaryValue::Bytes(data) => Ok(data.clone()),
            BoundaryValue::Double(value) => encode_f64(*value),
            BoundaryValue::Long(value) => Ok(encode_i64(*value)),
            BoundaryValue::Integer(value) => Ok(encode_i64(i64::from(*value))),
            BoundaryValue::Text(value) => Ok(value.as_bytes().to_vec()),
        }
    }
}

impl From<f64> for BoundaryValue {
    fn from(value: f64) -> Self {
        BoundaryValue::Double(value)
    }
}

impl From<i64> for BoundaryValue {
    fn from(value: i64) -> Self {
        BoundaryValue::Long(value)
    }
}

impl From<i32> for BoundaryValue {
    fn from(value: i32) -> Self {
        BoundaryValue::Integer(value)
    }
}

impl From<String> for BoundaryValue {
    fn from(value: String) -> Self {
        BoundaryValue::Text(value)
    }
}

impl From<&str> for BoundaryValue {
    fn from(value: &str) -> Self {
        BoundaryValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for BoundaryValue {
    fn from(value: Vec<u8>) -> Self {
        BoundaryValue::Bytes(value)
    }
}

impl From<&[u8]> for BoundaryValue {
    fn from(value: &[u8]) -> Self {
        BoundaryValue::Bytes(value.to_vec())
    }
}

/// One side of a range.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    value: Option<BoundaryValue>,
    inclusive: bool,
}

impl Boundary {
    /// The unbounded side.
    pub const INFINITY: Boundary = Boundary {
        value: None,
        inclusive: true,
    };

    pub fn inclusive(value: impl Into<BoundaryValue>) -> Self {
        Boundary {
            value: Some(value.into()),
            inclusive: true,
        }
    }

    pub fn exclusive(value: impl Into<BoundaryValue>) -> Self {
        Boundary {
            value: Some(value.into()),
            inclusive: false,
        }
    }

    pub fn value(&self) -> Option<&BoundaryValue> {
        self.value.as_ref()
    }

    pub fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    pub fn is_infinite(&self) -> bool {
        self.value.is_none()
    }
}

/// Encodes a score boundary, substituting `default` when it has no value.
pub fn boundary_to_bytes(boundary: Option<&Boundary>, default: &[u8]) -> TkvResult<Vec<u8>> {
    let value = match boundary.and_then(Boundary::value) {
        Some(value) => value,
        None => return Ok(default.to_vec()),
    };
    let encoded = value.to_bytes()?;
    // Inclusive is the store's default, so only exclusive needs a marker.
    if boundary.map_or(true, Boundary::is_inclusive) {
        return Ok(encoded);
    }
    let mut out = Vec::with_capacity(encoded.len() + 1);
    out.push(EXCLUSIVE_PREFIX);
    out.extend_from_slice(&encoded);
    Ok(out)
}

/// Encodes a lexicographic boundary, substituting `default` when it has no value.
pub fn lex_boundary_to_bytes(boundary: Option<&Boundary>, default: &[u8]) -> TkvResult<Vec<u8>> {
    let (value, inclusive) = match boundary {
        Some(Boundary {
            value: Some(value),
            inclusive,
        }) => (value, *inclusive),
        _ => return Ok(default.to_vec()),
    };
    let encoded = value.to_bytes()?;
    let mut out = Vec::with_capacity(encoded.len() + 1);
    out.push(if inclusive {
        LEX_INCLUSIVE_PREFIX
    } else {
        EXCLUSIVE_PREFIX
    });
    out.extend_from_slice(&encoded);
    Ok(out)
}

/// Pair of optional boundaries built fluently.
///
/// ```rust
/// use tkv_common::ScoreRange;
///
/// let range = ScoreRange::new().gte(1.0).lt(2.5);
/// let (min, max) = range.to_score_bytes().unwrap();
/// assert_eq!(min, b"1");
/// assert_eq!(max, b"(2.5");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreRange {
    min: Option<Boundary>,
    max: Option<Boundary>,
}

impl ScoreRange {
    /// Empty range; both sides unbounded until set.
    pub fn new() -> Self {
        ScoreRange::default()
    }

    /// Both sides explicitly infinite.
    pub fn unbounded() -> Self {
        ScoreRange {
            min: Some(Boundary::INFINITY),
            max: Some(Boundary::INFINITY),
        }
    }

    /// `min <= score <= max`.
    pub fn closed(min: impl Into<BoundaryValue>, max: impl Into<BoundaryValue>) -> Self {
        ScoreRange::new().gte(min).lte(max)
    }

    pub fn gte(mut self, min: impl Into<BoundaryValue>) -> Self {
        self.min = Some(Boundary::inclusive(min));
        self
    }

    pub fn gt(mut self, min: impl Into<BoundaryValue>) -> Self {
        self.min = Some(Boundary::exclusive(min));
        self
    }

    pub fn lte(mut self, max: impl Into<BoundaryValue>) -> Self {
        self.max = Some(Boundary::inclusive(max));
        self
    }

    pub fn lt(mut self, max: impl Into<BoundaryValue>) -> Self {
        self.max = Some(Boundary::exclusive(max));
        self
    }

    pub fn min(&self) -> Option<&Boundary> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&Boundary> {
        self.max.as_ref()
    }

    /// Encodes `(min, max)` for `ZRANGEBYSCORE`-style commands.
    pub fn to_score_bytes(&self) -> TkvResult<(Vec<u8>, Vec<u8>)> {
        Ok((
            boundary_to_bytes(self.min(), NEGATIVE_INFINITY_BYTES)?,
            boundary_to_bytes(self.max(), POSITIVE_INFINITY_BYTES)?,
        ))
    }

    /// Encodes `(min, max)` for `ZRANGEBYLEX`-style commands.
    pub fn to_lex_bytes(&self) -> TkvResult<(Vec<u8>, Vec<u8>)> {
        Ok((
            lex_boundary_to_bytes(self.min(), LEX_MIN_BYTES)?,
            lex_boundary_to_bytes(self.max(), LEX_MAX_BYTES)?,
        ))
    }
}

/// Offset/count window for range commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    /// No `LIMIT` clause at all.
    #[default]
    Unlimited,
    /// `LIMIT offset count`; a negative count means "all remaining".
    Bounded { offset: i64, count: i64 },
}

impl Limit {
    pub const fn unlimited() -> Self {
        Limit::Unlimited
    }

    pub const fn new(offset: i64, count: i64) -> Self {
        Limit::Bounded { offset, count }
    }

    pub const fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    /// Appends `LIMIT offset count` unless unlimited.
    pub fn push_args(&self, args: &mut Vec<Vec<u8>>) {
        if let Limit::Bounded { offset, count } = *self {
            args.push(b"LIMIT".to_vec());
            args.push(encode_i64(offset));
            args.push(encode_i64(count));
        }
    }
}
