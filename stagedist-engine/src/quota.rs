//! Proportional integer quotas.
//!
//! The canonical policy floors every share and hands the remainder to the
//! first category, so the counts always add back up to the total. The legacy
//! policy rounds each share independently and makes no such promise.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::numbers::{round_half_even_f64_to_u64, scaled_floor, u128_to_f64};

/// Per-category counts in weight order.
pub type Counts = SmallVec<[u64; 8]>;

/// How a total is split across weighted categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaPolicy {
    /// Floor each share, then add what is left to the first category.
    #[default]
    FloorRemainder,
    /// Round each share to nearest (half to even). Kept for reproducing
    /// tables produced by the older tool; totals may drift by a few units.
    RoundNearest,
}

/// Errors raised when a weight vector cannot be scaled.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuotaError {
    #[error("weights across {categories} categories sum to zero")]
    DegenerateWeights { categories: usize },
}

impl QuotaPolicy {
    /// Split `total` across `weights`.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::DegenerateWeights`] when the weights are empty or
    /// all zero.
    pub fn allocate(self, total: u64, weights: &[u64]) -> Result<Counts, QuotaError> {
        let sum: u128 = weights.iter().copied().map(u128::from).sum();
        if sum == 0 {
            return Err(QuotaError::DegenerateWeights {
                categories: weights.len(),
            });
        }

        match self {
            Self::FloorRemainder => {
                let mut counts: Counts = weights
                    .iter()
                    .map(|w| scaled_floor(total, *w, sum))
                    .collect();
                let assigned: u64 = counts.iter().sum();
                counts[0] += total - assigned;
                Ok(counts)
            }
            Self::RoundNearest => {
                let denom = u128_to_f64(sum);
                Ok(weights
                    .iter()
                    .map(|w| {
                        let share = u128_to_f64(u128::from(total) * u128::from(*w)) / denom;
                        round_half_even_f64_to_u64(share)
                    })
                    .collect())
            }
        }
    }

    /// Whether the policy guarantees `sum(counts) == total`.
    #[must_use]
    pub const fn conserves_total(self) -> bool {
        matches!(self, Self::FloorRemainder)
    }
}
