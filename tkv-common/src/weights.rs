//! # Aggregation Weights
//!
//! Per-input-set multipliers for `ZUNIONSTORE` / `ZINTERSTORE`, plus the
//! aggregate function selector.

use crate::convert::encode_f64;
use crate::error::{TkvError, TkvResult};

/// How scores of equal members are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Aggregate {
    #[default]
    Sum,
    Min,
    Max,
}

impl Aggregate {
    pub const fn as_bytes(&self) -> &'static [u8] {
        match self {
            Aggregate::Sum => b"SUM",
            Aggregate::Min => b"MIN",
            Aggregate::Max => b"MAX",
        }
    }
}

/// Ordered weights, one per input set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Weights {
    weights: Vec<f64>,
}

impl Weights {
    pub fn new(weights: Vec<f64>) -> Self {
        Weights { weights }
    }

    pub fn of(weights: &[f64]) -> Self {
        Weights::new(weights.to_vec())
    }

    pub fn from_ints(weights: &[i64]) -> Self {
        Weights::new(weights.iter().map(|&w| w as f64).collect())
    }

    /// A weight of `1` for each of `count` sets.
    pub fn from_set_count(count: usize) -> Self {
        Weights::new(vec![1.0; count])
    }

    pub fn multiply(&self, multiplier: f64) -> Self {
        self.apply(|w| w * multiplier)
    }

    pub fn apply(&self, operator: impl Fn(f64) -> f64) -> Self {
        Weights::new(self.weights.iter().map(|&w| operator(w)).collect())
    }

    pub fn weight(&self, index: usize) -> Option<f64> {
        self.weights.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    /// Checks the one-weight-per-set contract.
    pub fn ensure_matches(&self, sets: usize) -> TkvResult<()> {
        if self.weights.len() != sets {
            return Err(TkvError::WeightsMismatch {
                weights: self.weights.len(),
                sets,
            });
        }
        Ok(())
    }

    /// Appends `WEIGHTS w1 .. wn`.
    pub fn push_args(&self, args: &mut Vec<Vec<u8>>) -> TkvResult<()> {
        args.push(b"WEIGHTS".to_vec());
        for weight in &self.weights {
            args.push(encode_f64(*weight)?);
        }
        Ok(())
    }
}
