//! Decision outcome estimation.
//!
//! One best-guess value per decision, from the reporters who voted on it:
//!
//! - **binary** decisions take the reputation-weighted mean;
//! - **scaled** decisions take the reputation-weighted median, which a
//!   minority cannot drag by reporting extreme values.
//!
//! Weights are renormalized over the voters of each column, so a reporter
//! who skipped a decision neither dilutes nor inflates its estimate.

use consensus_linalg::Matrix;
use tracing::trace;

use crate::bounds::DecisionBound;
use crate::error::RoundError;
use crate::reputation::{normalize, Reputation};
use crate::votes::VoteMatrix;
use crate::Result;

/// Absolute slack when comparing cumulative weight against one half.
pub const MEDIAN_TOLERANCE: f64 = 1e-12;

/// Default width of the ambiguous band around 0.5.
pub const DEFAULT_CATCH_P: f64 = 0.1;

/// Snaps a binary estimate onto {0, 0.5, 1}.
///
/// Values within `tolerance / 2` of 0.5 (inclusive) become 0.5, anything
/// below the band becomes 0 and anything above becomes 1.
///
/// # Example
///
/// ```rust
/// use consensus_engine::catch;
///
/// assert_eq!(catch(0.45, 0.1), 0.5);
/// assert_eq!(catch(0.39, 0.1), 0.0);
/// assert_eq!(catch(0.61, 0.1), 1.0);
/// ```
pub fn catch(value: f64, tolerance: f64) -> f64 {
    let half = tolerance / 2.0;
    if value < 0.5 - half {
        0.0
    } else if value > 0.5 + half {
        1.0
    } else {
        0.5
    }
}

/// Weighted arithmetic mean of `(value, weight)` pairs.
///
/// Weights are renormalized; all-zero weights count equally. The result is
/// clamped to the range of the values, so a unanimous column returns its
/// value exactly. Returns `None` for an empty slice.
pub fn weighted_mean(votes: &[(f64, f64)]) -> Option<f64> {
    if votes.is_empty() {
        return None;
    }
    let weights: Vec<f64> = votes.iter().map(|(_, w)| *w).collect();
    let w = normalize(&weights);
    let mean: f64 = votes.iter().zip(&w).map(|((v, _), w)| v * w).sum();

    let lo = votes.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min);
    let hi = votes.iter().map(|(v, _)| *v).fold(f64::NEG_INFINITY, f64::max);
    Some(mean.clamp(lo, hi))
}

/// Weighted median of `(value, weight)` pairs.
///
/// Pairs are sorted by value with a stable total order, so equal values keep
/// their input order. Walking upward, the result is the first value at which
/// cumulative normalized weight reaches one half: a cumulative weight of
/// exactly 0.5 returns the value at that point, otherwise the first value
/// that pushes the total past 0.5. Returns `None` for an empty slice.
///
/// # Example
///
/// ```rust
/// use consensus_engine::weighted_median;
///
/// let votes = [(1.0, 0.4), (2.0, 0.3), (3.0, 0.2), (4.0, 0.1)];
/// assert_eq!(weighted_median(&votes), Some(2.0));
///
/// // An exact half stops at the lower value.
/// assert_eq!(weighted_median(&[(1.0, 0.5), (2.0, 0.5)]), Some(1.0));
/// ```
pub fn weighted_median(votes: &[(f64, f64)]) -> Option<f64> {
    if votes.is_empty() {
        return None;
    }
    let weights: Vec<f64> = votes.iter().map(|(_, w)| *w).collect();
    let w = normalize(&weights);

    let mut pairs: Vec<(f64, f64)> = votes.iter().map(|(v, _)| *v).zip(w).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut cumulative = 0.0;
    for (value, weight) in &pairs {
        cumulative += weight;
        if cumulative >= 0.5 - MEDIAN_TOLERANCE {
            return Some(*value);
        }
    }
    pairs.last().map(|(v, _)| *v)
}

/// Estimates one column from its `(value, weight)` votes.
pub fn estimate_column(votes: &[(f64, f64)], bound: &DecisionBound) -> Option<f64> {
    if bound.is_scaled {
        weighted_median(votes)
    } else {
        weighted_mean(votes)
    }
}

/// Estimates every decision from the votes present in `votes`.
///
/// Missing cells are skipped; each column's weights are renormalized over
/// the reporters that voted on it.
///
/// # Errors
///
/// - [`RoundError::BoundsMismatch`] / [`RoundError::ReputationMismatch`] on shape errors
/// - [`RoundError::EmptyDecision`] when a column has no votes
pub fn estimate(
    votes: &VoteMatrix,
    bounds: &[DecisionBound],
    reputation: &Reputation,
) -> Result<Vec<f64>> {
    check_shape(votes.reporters(), votes.decisions(), bounds, reputation)?;
    let rep = reputation.as_slice();

    (0..votes.decisions())
        .map(|j| {
            let column: Vec<(f64, f64)> = votes.column_votes(j).map(|(i, v)| (v, rep[i])).collect();
            let outcome = estimate_column(&column, &bounds[j])
                .ok_or(RoundError::EmptyDecision { decision: j })?;
            trace!(decision = j, voters = column.len(), outcome, "estimated decision");
            Ok(outcome)
        })
        .collect()
}

/// Estimates every decision of a fully observed matrix.
pub fn estimate_filled(
    filled: &Matrix,
    bounds: &[DecisionBound],
    reputation: &Reputation,
) -> Result<Vec<f64>> {
    check_shape(filled.rows(), filled.cols(), bounds, reputation)?;
    let rep = reputation.as_slice();

    (0..filled.cols())
        .map(|j| {
            let column: Vec<(f64, f64)> = filled.column(j).into_iter().zip(rep.iter().copied()).collect();
            estimate_column(&column, &bounds[j]).ok_or(RoundError::EmptyDecision { decision: j })
        })
        .collect()
}

fn check_shape(
    reporters: usize,
    decisions: usize,
    bounds: &[DecisionBound],
    reputation: &Reputation,
) -> Result<()> {
    if bounds.len() != decisions {
        return Err(RoundError::BoundsMismatch {
            expected: decisions,
            actual: bounds.len(),
        });
    }
    if reputation.len() != reporters {
        return Err(RoundError::ReputationMismatch {
            expected: reporters,
            actual: reputation.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_boundaries() {
        assert_eq!(catch(0.5, 0.1), 0.5);
        assert_eq!(catch(0.39, 0.1), 0.0);
        assert_eq!(catch(0.61, 0.1), 1.0);
        assert_eq!(catch(0.45, 0.1), 0.5);
        assert_eq!(catch(0.55, 0.1), 0.5);
        assert_eq!(catch(0.0, 0.1), 0.0);
        assert_eq!(catch(1.0, 0.1), 1.0);
    }

    #[test]
    fn test_catch_zero_tolerance() {
        assert_eq!(catch(0.5, 0.0), 0.5);
        assert_eq!(catch(0.500001, 0.0), 1.0);
        assert_eq!(catch(0.499999, 0.0), 0.0);
    }

    #[test]
    fn test_weighted_median_fixture() {
        let votes = [(1.0, 0.4), (2.0, 0.3), (3.0, 0.2), (4.0, 0.1)];
        assert_eq!(weighted_median(&votes), Some(2.0));
    }

    #[test]
    fn test_weighted_median_order_independent() {
        let votes = [(4.0, 0.1), (2.0, 0.3), (1.0, 0.4), (3.0, 0.2)];
        assert_eq!(weighted_median(&votes), Some(2.0));
    }

    #[test]
    fn test_weighted_median_exact_half() {
        assert_eq!(weighted_median(&[(2.0, 0.25), (1.0, 0.25), (3.0, 0.5)]), Some(2.0));
        assert_eq!(weighted_median(&[(10.0, 1.0), (20.0, 1.0)]), Some(10.0));
    }

    #[test]
    fn test_weighted_median_heavy_voter() {
        assert_eq!(weighted_median(&[(0.1, 0.2), (0.9, 0.6), (0.3, 0.2)]), Some(0.9));
    }

    #[test]
    fn test_weighted_median_zero_weights_count_equally() {
        assert_eq!(weighted_median(&[(0.2, 0.0), (0.8, 0.0), (0.5, 0.0)]), Some(0.5));
    }

    #[test]
    fn test_weighted_mean() {
        assert_eq!(weighted_mean(&[(1.0, 3.0), (0.0, 1.0)]), Some(0.75));
        assert_eq!(weighted_mean(&[]), None);
    }

    #[test]
    fn test_weighted_mean_unanimous_is_exact() {
        let votes = vec![(1.0, 1.0 / 6.0); 6];
        assert_eq!(weighted_mean(&votes), Some(1.0));
    }

    #[test]
    fn test_estimate_renormalizes_over_voters() {
        let votes = VoteMatrix::new(vec![
            vec![Some(1.0), None],
            vec![Some(0.0), Some(0.2)],
            vec![None, Some(0.8)],
        ])
        .unwrap();
        let rep = Reputation::from_weights(&[0.5, 0.25, 0.25]).unwrap();
        let bounds = [DecisionBound::binary(), DecisionBound::scaled(0.0, 1.0)];
        let out = estimate(&votes, &bounds, &rep).unwrap();

        // Column 0: (1·0.5 + 0·0.25) / 0.75
        assert!((out[0] - 2.0 / 3.0).abs() < 1e-12);
        // Column 1: equal weights 0.5 / 0.5, exact half stops at 0.2.
        assert_eq!(out[1], 0.2);
    }

    #[test]
    fn test_estimate_empty_column_is_fatal() {
        let votes = VoteMatrix::new(vec![vec![Some(1.0), None], vec![Some(0.0), None]]).unwrap();
        let rep = Reputation::uniform(2);
        let err = estimate(&votes, &[DecisionBound::binary(); 2], &rep).unwrap_err();
        assert_eq!(err, RoundError::EmptyDecision { decision: 1 });
    }

    #[test]
    fn test_estimate_filled_matches_estimate() {
        let dense = Matrix::from_rows(vec![vec![1.0, 0.3], vec![0.0, 0.7], vec![1.0, 0.5]]).unwrap();
        let rep = Reputation::from_weights(&[0.2, 0.3, 0.5]).unwrap();
        let bounds = [DecisionBound::binary(), DecisionBound::scaled(0.0, 1.0)];
        let a = estimate_filled(&dense, &bounds, &rep).unwrap();
        let b = estimate(&VoteMatrix::from(&dense), &bounds, &rep).unwrap();
        assert_eq!(a, b);
        assert!((a[0] - 0.7).abs() < 1e-12);
        assert_eq!(a[1], 0.5);
    }
}
