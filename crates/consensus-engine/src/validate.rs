//! Input validation run before any statistics.

use tracing::warn;

use crate::bounds::{validate_bounds, DecisionBound};
use crate::error::RoundError;
use crate::votes::VoteMatrix;
use crate::Result;

/// Checks that a round's votes and bounds can be resolved.
///
/// - bounds match the decision count and are well formed
/// - every present vote lies within its decision's native range
/// - every decision has at least one vote
///
/// Finiteness and rectangularity are already guaranteed by [`VoteMatrix`].
///
/// # Example
///
/// ```rust
/// use consensus_engine::{validate_votes, DecisionBound, RoundError, VoteMatrix};
///
/// let votes = VoteMatrix::new(vec![vec![Some(1.0), Some(250.0)]])?;
/// let bounds = [DecisionBound::binary(), DecisionBound::scaled(0.0, 200.0)];
/// assert!(matches!(
///     validate_votes(&votes, &bounds),
///     Err(RoundError::VoteOutOfBounds { reporter: 0, decision: 1, .. })
/// ));
/// # Ok::<(), RoundError>(())
/// ```
pub fn validate_votes(votes: &VoteMatrix, bounds: &[DecisionBound]) -> Result<()> {
    validate_bounds(bounds, votes.decisions())?;

    for (reporter, row) in votes.rows().iter().enumerate() {
        for (decision, cell) in row.iter().enumerate() {
            let Some(value) = *cell else { continue };
            let (min, max) = bounds[decision].range();
            if value < min || value > max {
                warn!(reporter, decision, value, "vote outside decision range");
                return Err(RoundError::VoteOutOfBounds {
                    reporter,
                    decision,
                    value,
                    min,
                    max,
                });
            }
        }
    }

    for decision in 0..votes.decisions() {
        if votes.column_votes(decision).next().is_none() {
            return Err(RoundError::EmptyDecision { decision });
        }
    }
    Ok(())
}
