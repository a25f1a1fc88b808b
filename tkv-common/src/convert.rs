//! # Argument Encoding
//!
//! Purpose: Turn numbers and range boundaries into the textual byte forms the
//! store's command parser accepts.
//!
//! ## Design Principles
//! 1. **Store-Compatible Text**: Doubles render as plain decimals (never
//!    scientific notation) using the shortest representation that parses back
//!    to the same `f64`, which matches the store's own score formatter.
//! 2. **Stack Buffers**: Integers are rendered through a fixed stack buffer.
//! 3. **Fail Fast**: NaN has no wire form and is rejected up front.

use crate::error::{TkvError, TkvResult};

/// Token for an unbounded upper score limit.
pub const POSITIVE_INFINITY_BYTES: &[u8] = b"+inf";

/// Token for an unbounded lower score limit.
pub const NEGATIVE_INFINITY_BYTES: &[u8] = b"-inf";

/// Token for an unbounded upper lexicographic limit.
pub const LEX_MAX_BYTES: &[u8] = b"+";

/// Token for an unbounded lower lexicographic limit.
pub const LEX_MIN_BYTES: &[u8] = b"-";

/// Prefix marking an exclusive boundary.
pub const EXCLUSIVE_PREFIX: u8 = b'(';

/// Prefix marking an inclusive lexicographic boundary.
pub const LEX_INCLUSIVE_PREFIX: u8 = b'[';

/// Encodes a signed integer as ASCII decimal.
pub fn encode_i64(value: i64) -> Vec<u8> {
    let mut out = Vec::with_capacity(20);
    push_i64(&mut out, value);
    out
}

/// Appends a signed integer as ASCII decimal.
pub fn push_i64(out: &mut Vec<u8>, value: i64) {
    // Write digits into a small stack buffer to avoid heap allocations.
    let mut buf = [0u8; 20];
    let mut len = 0;
    let mut magnitude = value.unsigned_abs();
    if magnitude == 0 {
        buf[0] = b'0';
        len = 1;
    }
    while magnitude > 0 {
        buf[len] = b'0' + (magnitude % 10) as u8;
        magnitude /= 10;
        len += 1;
    }
    if value < 0 {
        out.push(b'-');
    }
    for idx in (0..len).rev() {
        out.push(buf[idx]);
    }
}

/// Encodes a double the way the store prints scores.
///
/// # Errors
/// Returns `TkvError::InvalidArgument` for NaN.
pub fn encode_f64(value: f64) -> TkvResult<Vec<u8>> {
    if value.is_nan() {
        return Err(TkvError::invalid("NaN is not a valid score"));
    }
    if value.is_infinite() {
        let token = if value > 0.0 {
            POSITIVE_INFINITY_BYTES
        } else {
            NEGATIVE_INFINITY_BYTES
        };
        return Ok(token.to_vec());
    }
    // `Display` for f64 is shortest round-trip and never uses an exponent.
    Ok(value.to_string().into_bytes())
}

/// Parses a score reply (`"1.5"`, `"inf"`, `"-inf"`).
pub fn parse_f64(data: &[u8]) -> Option<f64> {
    std::str::from_utf8(data).ok()?.trim().parse().ok()
}

/// Parses an ASCII decimal integer.
pub fn parse_i64(data: &[u8]) -> Option<i64> {
    std::str::from_utf8(data).ok()?.parse().ok()
}
