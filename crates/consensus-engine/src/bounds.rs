//! Decision bounds and the rescaler.
//!
//! Binary decisions live on [0, 1] already. Scaled decisions declare their
//! native `(min, max)` range and are mapped affinely onto [0, 1] before any
//! statistics run, then mapped back when the round is resolved.

use serde::{Deserialize, Serialize};

use crate::error::RoundError;
use crate::votes::VoteMatrix;
use crate::Result;

/// Range metadata for one decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionBound {
    /// `false` for a binary decision with implicit bounds [0, 1].
    #[serde(default)]
    pub is_scaled: bool,
    /// Lower end of the native range.
    #[serde(default)]
    pub min: f64,
    /// Upper end of the native range.
    #[serde(default = "default_max")]
    pub max: f64,
}

fn default_max() -> f64 {
    1.0
}

impl Default for DecisionBound {
    fn default() -> Self {
        Self::binary()
    }
}

impl DecisionBound {
    /// A binary yes/no decision.
    pub const fn binary() -> Self {
        Self {
            is_scaled: false,
            min: 0.0,
            max: 1.0,
        }
    }

    /// A scaled decision over `[min, max]`.
    pub const fn scaled(min: f64, max: f64) -> Self {
        Self {
            is_scaled: true,
            min,
            max,
        }
    }

    /// Effective native range: `[0, 1]` for binary decisions.
    pub fn range(&self) -> (f64, f64) {
        if self.is_scaled {
            (self.min, self.max)
        } else {
            (0.0, 1.0)
        }
    }

    /// Checks the bound for decision index `decision`.
    pub fn validate(&self, decision: usize) -> Result<()> {
        if !self.is_scaled {
            return Ok(());
        }
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(RoundError::NonFiniteBounds { decision });
        }
        if self.max == self.min {
            return Err(RoundError::ZeroSpan {
                decision,
                min: self.min,
                max: self.max,
            });
        }
        if self.max < self.min {
            return Err(RoundError::InvertedBounds {
                decision,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Maps a native value onto the [0, 1] working scale.
    pub fn scale(&self, value: f64) -> f64 {
        if self.is_scaled {
            (value - self.min) / (self.max - self.min)
        } else {
            value
        }
    }

    /// Maps a working-scale value back into the native range.
    pub fn unscale(&self, value: f64) -> f64 {
        if self.is_scaled {
            value * (self.max - self.min) + self.min
        } else {
            value
        }
    }
}

/// Validates every bound and their count against `decisions`.
pub fn validate_bounds(bounds: &[DecisionBound], decisions: usize) -> Result<()> {
    if bounds.len() != decisions {
        return Err(RoundError::BoundsMismatch {
            expected: decisions,
            actual: bounds.len(),
        });
    }
    bounds
        .iter()
        .enumerate()
        .try_for_each(|(j, bound)| bound.validate(j))
}

/// Maps every present vote onto the [0, 1] working scale.
///
/// Missing cells stay missing. Binary columns pass through unchanged.
///
/// # Errors
///
/// Fails on a bounds/column count mismatch or an invalid scaled bound
/// (zero span, inverted or non-finite).
///
/// # Example
///
/// ```rust
/// use consensus_engine::{rescale, DecisionBound, VoteMatrix};
///
/// let raw = VoteMatrix::new(vec![vec![Some(1.0), Some(150.0)], vec![None, Some(100.0)]])?;
/// let bounds = [DecisionBound::binary(), DecisionBound::scaled(100.0, 200.0)];
/// let scaled = rescale(&raw, &bounds)?;
/// assert_eq!(scaled.get(0, 1), Some(0.5));
/// assert_eq!(scaled.get(1, 0), None);
/// # Ok::<(), consensus_engine::RoundError>(())
/// ```
pub fn rescale(raw: &VoteMatrix, bounds: &[DecisionBound]) -> Result<VoteMatrix> {
    validate_bounds(bounds, raw.decisions())?;
    Ok(raw.map_present(|j, v| bounds[j].scale(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_passthrough() {
        let b = DecisionBound::binary();
        assert_eq!(b.scale(0.7), 0.7);
        assert_eq!(b.unscale(0.7), 0.7);
        assert_eq!(b.range(), (0.0, 1.0));
    }

    #[test]
    fn test_scaled_round_trip() {
        let b = DecisionBound::scaled(-20.0, 80.0);
        assert_eq!(b.scale(30.0), 0.5);
        assert_eq!(b.unscale(0.5), 30.0);
        assert_eq!(b.scale(-20.0), 0.0);
        assert_eq!(b.scale(80.0), 1.0);
    }

    #[test]
    fn test_zero_span_fails_loudly() {
        let err = DecisionBound::scaled(5.0, 5.0).validate(2).unwrap_err();
        assert_eq!(
            err,
            RoundError::ZeroSpan {
                decision: 2,
                min: 5.0,
                max: 5.0
            }
        );
    }

    #[test]
    fn test_binary_ignores_declared_range() {
        // Binary decisions use implicit [0, 1]; declared values are not checked.
        let b = DecisionBound {
            is_scaled: false,
            min: 3.0,
            max: 3.0,
        };
        assert!(b.validate(0).is_ok());
        assert_eq!(b.range(), (0.0, 1.0));
    }

    #[test]
    fn test_inverted_and_non_finite() {
        assert!(matches!(
            DecisionBound::scaled(10.0, 0.0).validate(1),
            Err(RoundError::InvertedBounds { decision: 1, .. })
        ));
        assert!(matches!(
            DecisionBound::scaled(0.0, f64::INFINITY).validate(4),
            Err(RoundError::NonFiniteBounds { decision: 4 })
        ));
    }

    #[test]
    fn test_rescale_checks_count() {
        let raw = VoteMatrix::new(vec![vec![Some(1.0), Some(0.0)]]).unwrap();
        let err = rescale(&raw, &[DecisionBound::binary()]).unwrap_err();
        assert_eq!(
            err,
            RoundError::BoundsMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_serde_defaults_to_binary() {
        let b: DecisionBound = serde_json::from_str("{}").unwrap();
        assert_eq!(b, DecisionBound::binary());
        let s: DecisionBound =
            serde_json::from_str(r#"{"is_scaled": true, "min": 0, "max": 500}"#).unwrap();
        assert_eq!(s, DecisionBound::scaled(0.0, 500.0));
    }
}
