//! # Expiration
//!
//! Key time-to-live attached to `SET`-style commands. The unit is normalized
//! to seconds or milliseconds because those are the only two the store takes
//! (`EX` / `PX`).

use std::time::Duration;

use crate::convert::encode_i64;

/// Unit of an [`Expiration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpirationUnit {
    Seconds,
    Milliseconds,
}

/// Expiration magnitude plus unit, or the persistent sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expiration {
    amount: i64,
    unit: ExpirationUnit,
}

impl Expiration {
    /// Expiration in whole seconds.
    pub const fn seconds(amount: i64) -> Self {
        Expiration {
            amount,
            unit: ExpirationUnit::Seconds,
        }
    }

    /// Expiration in milliseconds.
    pub const fn milliseconds(amount: i64) -> Self {
        Expiration {
            amount,
            unit: ExpirationUnit::Milliseconds,
        }
    }

    /// No expiration at all.
    pub const fn persistent() -> Self {
        Expiration::seconds(-1)
    }

    /// Picks seconds when the duration is a whole number of seconds,
    /// milliseconds otherwise. Sub-millisecond precision is truncated.
    pub fn from_duration(duration: Duration) -> Self {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        if millis % 1000 == 0 {
            Expiration::seconds(millis / 1000)
        } else {
            Expiration::milliseconds(millis)
        }
    }

    /// Returns true for the "no expiry" sentinel.
    pub const fn is_persistent(&self) -> bool {
        self.amount == -1
    }

    /// Magnitude in [`Expiration::unit`].
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    pub const fn unit(&self) -> ExpirationUnit {
        self.unit
    }

    /// Magnitude converted to milliseconds.
    pub fn as_millis(&self) -> i64 {
        match self.unit {
            ExpirationUnit::Seconds => self.amount.saturating_mul(1000),
            ExpirationUnit::Milliseconds => self.amount,
        }
    }

    /// Appends `EX n` or `PX n`; persistent expirations append nothing.
    pub fn push_args(&self, args: &mut Vec<Vec<u8>>) {
        if self.is_persistent() {
            return;
        }
        let token: &[u8] = match self.unit {
            ExpirationUnit::Seconds => b"EX",
            ExpirationUnit::Milliseconds => b"PX",
        };
        args.push(token.to_vec());
        args.push(encode_i64(self.amount));
    }
}

impl From<Duration> for Expiration {
    fn from(duration: Duration) -> Self {
        Expiration::from_duration(duration)
    }
}
