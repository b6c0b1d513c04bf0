//! Reputation vectors.
//!
//! A [`Reputation`] is a point on the probability simplex: one
//! non-negative weight per reporter, summing to 1. Every reputation the
//! engine produces goes through [`normalize`], which is also the weighting
//! function used for bonuses and sign disambiguation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RoundError;
use crate::Result;

/// Turns an arbitrary vector into weights summing to 1.
///
/// Takes absolute values, falls back to equal weights when they are all
/// zero, then divides by the sum. A non-positive vector therefore weights
/// its most negative entries highest, which is what the reflected branch of
/// sign disambiguation relies on.
///
/// # Example
///
/// ```rust
/// use consensus_engine::normalize;
///
/// assert_eq!(normalize(&[1.0, 3.0]), vec![0.25, 0.75]);
/// assert_eq!(normalize(&[-2.0, 0.0]), vec![1.0, 0.0]);
/// assert_eq!(normalize(&[0.0, 0.0]), vec![0.5, 0.5]);
/// ```
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let abs: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    let total: f64 = abs.iter().sum();
    if total == 0.0 {
        if !values.is_empty() {
            debug!(len = values.len(), "all-zero weights, falling back to uniform");
        }
        let n = values.len() as f64;
        return vec![1.0 / n; values.len()];
    }
    abs.into_iter().map(|v| v / total).collect()
}

/// Normalized per-reporter weights.
///
/// Serializes as a plain array. Deserializing goes through
/// [`Reputation::from_weights`], so a parsed value is always on the simplex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Reputation(Vec<f64>);

impl Reputation {
    /// Equal weight `1/n` for each of `n` reporters.
    pub fn uniform(n: usize) -> Self {
        Self(vec![1.0 / n as f64; n])
    }

    /// Validates raw prior weights and normalizes them.
    ///
    /// # Errors
    ///
    /// [`RoundError::InvalidReputation`] for a negative or non-finite entry.
    pub fn from_weights(weights: &[f64]) -> Result<Self> {
        for (reporter, &value) in weights.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(RoundError::InvalidReputation { reporter, value });
            }
        }
        Ok(Self(normalize(weights)))
    }

    /// The prior for a round of `reporters`: `weights` if given, else uniform.
    ///
    /// # Errors
    ///
    /// [`RoundError::ReputationMismatch`] on a length mismatch, plus the
    /// errors of [`Reputation::from_weights`].
    pub fn prior(weights: Option<&[f64]>, reporters: usize) -> Result<Self> {
        match weights {
            None => Ok(Self::uniform(reporters)),
            Some(w) if w.len() != reporters => Err(RoundError::ReputationMismatch {
                expected: reporters,
                actual: w.len(),
            }),
            Some(w) => Self::from_weights(w),
        }
    }

    /// Wraps a vector already on the simplex.
    pub(crate) fn from_normalized(weights: Vec<f64>) -> Self {
        Self(weights)
    }

    /// Borrows the weights.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consumes into the weight vector.
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// Number of reporters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no reporters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mean weight (`1/n` for a normalized vector).
    pub fn mean(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().sum::<f64>() / self.0.len() as f64
    }

    /// Sum of the weights.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl AsRef<[f64]> for Reputation {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for Reputation {
    type Error = RoundError;

    fn try_from(weights: Vec<f64>) -> Result<Self> {
        Self::from_weights(&weights)
    }
}

impl From<Reputation> for Vec<f64> {
    fn from(r: Reputation) -> Self {
        r.0
    }
}
