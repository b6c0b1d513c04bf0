//! First-factor extraction.
//!
//! The dominant eigenvector of the reputation-weighted decision covariance
//! (the *first loading*) is the direction along which reporters disagree
//! the most. Projecting each reporter's centred votes onto it gives the
//! *first score*, a signed measure of which side of that disagreement the
//! reporter stands on.

use consensus_linalg::{weighted_covariance, EigenSolver, Matrix};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RoundError;
use crate::reputation::Reputation;
use crate::Result;

/// Output of [`extract`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loading {
    /// Dominant eigenvector of the weighted covariance, one entry per decision.
    pub first_loading: Vec<f64>,
    /// Projection of each reporter's centred votes onto `first_loading`.
    pub first_score: Vec<f64>,
    /// Eigenvalue belonging to `first_loading`.
    pub eigenvalue: f64,
    /// Reputation-weighted mean of each decision.
    pub center: Vec<f64>,
}

impl Loading {
    /// Returns true if the covariance carried no signal at all.
    pub fn is_degenerate(&self) -> bool {
        self.first_score.iter().all(|s| *s == 0.0)
    }
}

/// Extracts the first loading and first score of a filled vote matrix.
///
/// With a zero covariance (every decision unanimous) the loading direction
/// is arbitrary and every score is zero; the reward stage treats that as
/// "no update".
///
/// # Errors
///
/// [`RoundError::ReputationMismatch`] on a length mismatch and
/// [`RoundError::Numeric`] if the solver fails.
pub fn extract(
    filled: &Matrix,
    reputation: &Reputation,
    solver: &dyn EigenSolver,
) -> Result<Loading> {
    if reputation.len() != filled.rows() {
        return Err(RoundError::ReputationMismatch {
            expected: filled.rows(),
            actual: reputation.len(),
        });
    }

    let cov = weighted_covariance(filled, reputation.as_slice())?;
    let pair = solver.dominant_eigenvector(&cov.covariance)?;
    let first_score = cov.centered.mul_vec(&pair.vector)?;

    debug!(
        eigenvalue = pair.value,
        decisions = filled.cols(),
        reporters = filled.rows(),
        "extracted first loading"
    );

    Ok(Loading {
        first_loading: pair.vector,
        first_score,
        eigenvalue: pair.value,
        center: cov.mean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_linalg::JacobiSolver;

    #[test]
    fn test_unanimous_is_degenerate() {
        let filled = Matrix::from_rows(vec![vec![1.0, 0.0]; 3]).unwrap();
        let loading = extract(&filled, &Reputation::uniform(3), &JacobiSolver::default()).unwrap();
        assert!(loading.is_degenerate());
        assert_eq!(loading.eigenvalue, 0.0);
        assert_eq!(loading.center, vec![1.0, 0.0]);
    }

    #[test]
    fn test_outlier_scores_opposite_majority() {
        let filled = Matrix::from_rows(vec![
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ])
        .unwrap();
        let loading = extract(&filled, &Reputation::uniform(4), &JacobiSolver::default()).unwrap();
        assert!(!loading.is_degenerate());
        assert!(loading.first_score[0] * loading.first_score[3] < 0.0);
        assert!(loading.first_score[3].abs() > loading.first_score[0].abs());
    }

    #[test]
    fn test_reputation_length_checked() {
        let filled = Matrix::from_rows(vec![vec![1.0], vec![0.0]]).unwrap();
        assert!(matches!(
            extract(&filled, &Reputation::uniform(3), &JacobiSolver::default()),
            Err(RoundError::ReputationMismatch { expected: 2, actual: 3 })
        ));
    }
}
