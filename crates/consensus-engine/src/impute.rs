//! Missing-vote imputation.
//!
//! A missing vote is replaced by the column's reputation-weighted estimate
//! under the *prior* reputation. Imputed binary votes are then caught onto
//! {0, 0.5, 1}, so nobody can steer the fill-in with carefully chosen
//! fractional votes. Observed votes are never touched.

use consensus_linalg::Matrix;
use tracing::debug;

use crate::bounds::DecisionBound;
use crate::error::RoundError;
use crate::outcome::{catch, estimate};
use crate::reputation::Reputation;
use crate::votes::VoteMatrix;
use crate::Result;

/// Fills every missing cell of a rescaled vote matrix.
///
/// Returns the input unchanged (as a dense matrix) when nothing is missing.
///
/// # Errors
///
/// - [`RoundError::InvalidParameter`] when `catch_p` is outside [0, 1]
/// - [`RoundError::EmptyDecision`] when a column has no votes at all
/// - shape mismatches between `scaled`, `bounds` and `reputation`
///
/// # Example
///
/// ```rust
/// use consensus_engine::{impute, DecisionBound, Reputation, VoteMatrix};
///
/// let votes = VoteMatrix::new(vec![
///     vec![Some(1.0)],
///     vec![Some(1.0)],
///     vec![Some(0.0)],
///     vec![None],
/// ])?;
/// let filled = impute(&votes, &[DecisionBound::binary()], &Reputation::uniform(4), 0.1)?;
///
/// // Weighted mean 2/3 is caught to 1.
/// assert_eq!(filled[(3, 0)], 1.0);
/// # Ok::<(), consensus_engine::RoundError>(())
/// ```
pub fn impute(
    scaled: &VoteMatrix,
    bounds: &[DecisionBound],
    reputation: &Reputation,
    catch_p: f64,
) -> Result<Matrix> {
    if !(0.0..=1.0).contains(&catch_p) {
        return Err(RoundError::InvalidParameter {
            name: "catch_p",
            value: catch_p,
            reason: "must lie in [0, 1]",
        });
    }

    let missing = scaled.missing_count();
    if missing == 0 {
        return Ok(dense(scaled));
    }

    let outcomes = estimate(scaled, bounds, reputation)?;
    let fill: Vec<f64> = outcomes
        .iter()
        .zip(bounds)
        .map(|(&outcome, bound)| {
            if bound.is_scaled {
                outcome
            } else {
                catch(outcome, catch_p)
            }
        })
        .collect();

    let mut filled = Matrix::zeros(scaled.reporters(), scaled.decisions());
    for (i, row) in scaled.rows().iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            filled[(i, j)] = cell.unwrap_or(fill[j]);
        }
    }

    debug!(missing, decisions = scaled.decisions(), "imputed missing votes");
    Ok(filled)
}

fn dense(votes: &VoteMatrix) -> Matrix {
    let mut m = Matrix::zeros(votes.reporters(), votes.decisions());
    for (i, row) in votes.rows().iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            m[(i, j)] = cell.unwrap_or_default();
        }
    }
    m
}
