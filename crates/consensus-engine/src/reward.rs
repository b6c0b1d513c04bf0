//! Sign disambiguation and reputation update.
//!
//! An eigenvector and its negation are equally valid, so the first score
//! only says which reporters stand together, not which side is right. Two
//! candidate reputations are built, one per orientation, and the candidate
//! whose implied decision outcomes stay closest (in squared error) to what
//! the prior reputation implies is kept. Continuity with the previous round
//! is the tie-break, not a fixed "always positive" convention.

use consensus_linalg::Matrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RoundError;
use crate::reputation::{normalize, Reputation};
use crate::Result;

/// Default smoothing factor: fresh information moves reputation by at most 10%.
pub const DEFAULT_ALPHA: f64 = 0.1;

/// Which orientation of the first score was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignChoice {
    /// Scores shifted up by `|min|`; high scores earn reputation.
    Shifted,
    /// Scores shifted down by `max`; low scores earn reputation.
    Reflected,
}

/// Output of [`derive_reward`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardWeights {
    /// Reputation implied by this round alone.
    pub this_reputation: Reputation,
    /// `alpha · this + (1 - alpha) · old`; the next round's prior.
    pub smoothed_reputation: Reputation,
    /// Orientation that was kept.
    pub sign_choice: SignChoice,
    /// `Σ(New1 − Old)² − Σ(New2 − Old)²`; non-positive selects `Shifted`.
    pub reference_index: f64,
    /// True when the chosen score vector was all zeros and `this == old`.
    pub unchanged: bool,
}

/// Derives this round's reputation from the first score.
///
/// # Errors
///
/// - [`RoundError::InvalidParameter`] when `alpha` is outside [0, 1]
/// - [`RoundError::ReputationMismatch`] when `first_score`, `old` and the
///   rows of `filled` disagree in length
///
/// # Example
///
/// ```rust
/// use consensus_engine::{derive_reward, Reputation};
/// use consensus_linalg::Matrix;
///
/// let filled = Matrix::from_rows(vec![vec![1.0], vec![1.0], vec![0.0]])?;
/// let old = Reputation::uniform(3);
/// let reward = derive_reward(&[1.0, 1.0, -2.0], &old, &filled, 0.1)?;
///
/// // The dissenter loses all of this round's reputation.
/// assert_eq!(reward.this_reputation.as_slice()[2], 0.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn derive_reward(
    first_score: &[f64],
    old: &Reputation,
    filled: &Matrix,
    alpha: f64,
) -> Result<RewardWeights> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(RoundError::InvalidParameter {
            name: "alpha",
            value: alpha,
            reason: "must lie in [0, 1]",
        });
    }
    for len in [first_score.len(), filled.rows()] {
        if len != old.len() {
            return Err(RoundError::ReputationMismatch {
                expected: len,
                actual: old.len(),
            });
        }
    }

    let min = first_score.iter().copied().fold(f64::INFINITY, f64::min);
    let max = first_score.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let shifted: Vec<f64> = first_score.iter().map(|s| s + min.abs()).collect();
    let reflected: Vec<f64> = first_score.iter().map(|s| s - max).collect();

    let prior_outcomes = filled.weighted_column_sums(old.as_slice())?;
    let shifted_outcomes = filled.weighted_column_sums(&normalize(&shifted))?;
    let reflected_outcomes = filled.weighted_column_sums(&normalize(&reflected))?;
    let reference_index =
        squared_distance(&shifted_outcomes, &prior_outcomes) - squared_distance(&reflected_outcomes, &prior_outcomes);

    let (sign_choice, adjusted) = if reference_index <= 0.0 {
        (SignChoice::Shifted, shifted)
    } else {
        (SignChoice::Reflected, reflected)
    };

    let unchanged = adjusted.iter().all(|x| *x == 0.0);
    let this_reputation = if unchanged {
        debug!("no discriminating signal, reputation unchanged");
        old.clone()
    } else {
        // Scaling by old/mean(old) makes the update indifferent to how a
        // reporter's prior stake is split across identities. If only
        // zero-reputation reporters moved, this is all zeros and
        // `normalize` falls back to uniform.
        let mean = old.mean();
        let reweighted: Vec<f64> = adjusted
            .iter()
            .zip(old.as_slice())
            .map(|(a, o)| a * (o / mean))
            .collect();
        Reputation::from_normalized(normalize(&reweighted))
    };

    let smoothed = this_reputation
        .as_slice()
        .iter()
        .zip(old.as_slice())
        .map(|(t, o)| alpha * t + (1.0 - alpha) * o)
        .collect();

    debug!(?sign_choice, reference_index, unchanged, "derived reputation update");

    Ok(RewardWeights {
        this_reputation,
        smoothed_reputation: Reputation::from_normalized(smoothed),
        sign_choice,
        reference_index,
        unchanged,
    })
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_zero_scores_keep_old_reputation() {
        let filled = matrix(vec![vec![1.0, 0.0]; 3]);
        let old = Reputation::from_weights(&[0.5, 0.3, 0.2]).unwrap();
        let reward = derive_reward(&[0.0, 0.0, 0.0], &old, &filled, 0.1).unwrap();
        assert!(reward.unchanged);
        assert_eq!(reward.this_reputation, old);
        for (s, o) in reward.smoothed_reputation.as_slice().iter().zip(old.as_slice()) {
            assert!((s - o).abs() < 1e-15);
        }
    }

    #[test]
    fn test_signal_only_from_zero_reputation_is_uniform() {
        // Only reporter 2 scores, but it holds no prior reputation: the
        // reweighted vector vanishes and the update falls back to uniform.
        let filled = matrix(vec![vec![1.0], vec![1.0], vec![1.0]]);
        let old = Reputation::from_weights(&[0.5, 0.5, 0.0]).unwrap();
        let reward = derive_reward(&[0.0, 0.0, 1.0], &old, &filled, 0.1).unwrap();

        assert!(!reward.unchanged);
        assert_eq!(reward.sign_choice, SignChoice::Shifted);
        for w in reward.this_reputation.as_slice() {
            assert!((w - 1.0 / 3.0).abs() < 1e-15);
        }
        let smoothed = reward.smoothed_reputation.as_slice();
        assert!((smoothed[0] - (0.1 / 3.0 + 0.45)).abs() < 1e-12);
        assert!((smoothed[2] - 0.1 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sign_follows_prior_majority() {
        let filled = matrix(vec![vec![1.0], vec![1.0], vec![0.0]]);
        let old = Reputation::uniform(3);

        // Same geometry in both orientations: the majority must win either way.
        for scores in [[1.0, 1.0, -2.0], [-1.0, -1.0, 2.0]] {
            let reward = derive_reward(&scores, &old, &filled, 0.1).unwrap();
            let this = reward.this_reputation.as_slice();
            assert!((this[0] - 0.5).abs() < 1e-12);
            assert!((this[1] - 0.5).abs() < 1e-12);
            assert_eq!(this[2], 0.0);
        }
    }

    #[test]
    fn test_orientation_recorded() {
        let filled = matrix(vec![vec![1.0], vec![1.0], vec![0.0]]);
        let old = Reputation::uniform(3);
        let up = derive_reward(&[1.0, 1.0, -2.0], &old, &filled, 0.1).unwrap();
        let down = derive_reward(&[-1.0, -1.0, 2.0], &old, &filled, 0.1).unwrap();
        assert_eq!(up.sign_choice, SignChoice::Shifted);
        assert!(up.reference_index <= 0.0);
        assert_eq!(down.sign_choice, SignChoice::Reflected);
        assert!(down.reference_index > 0.0);
    }

    #[test]
    fn test_smoothing_blend() {
        let filled = matrix(vec![vec![1.0], vec![1.0], vec![0.0]]);
        let old = Reputation::uniform(3);
        let reward = derive_reward(&[1.0, 1.0, -2.0], &old, &filled, 0.1).unwrap();
        let smoothed = reward.smoothed_reputation.as_slice();
        assert!((smoothed[0] - (0.1 * 0.5 + 0.9 / 3.0)).abs() < 1e-12);
        assert!((smoothed[2] - 0.9 / 3.0).abs() < 1e-12);
        assert!((reward.smoothed_reputation.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_split_identity_is_neutral() {
        // Reporter 0 holding 0.5 gains the same total as two identities of 0.25.
        let merged_filled = matrix(vec![vec![1.0], vec![1.0], vec![0.0]]);
        let merged_old = Reputation::from_weights(&[0.5, 0.25, 0.25]).unwrap();
        let merged = derive_reward(&[1.0, 1.0, -2.0], &merged_old, &merged_filled, 0.1).unwrap();

        let split_filled = matrix(vec![vec![1.0], vec![1.0], vec![1.0], vec![0.0]]);
        let split_old = Reputation::from_weights(&[0.25, 0.25, 0.25, 0.25]).unwrap();
        let split = derive_reward(&[1.0, 1.0, 1.0, -3.0], &split_old, &split_filled, 0.1).unwrap();

        let m = merged.this_reputation.as_slice();
        let s = split.this_reputation.as_slice();
        assert!((m[0] - (s[0] + s[1])).abs() < 1e-12);
    }

    #[test]
    fn test_deserialized_weights_stay_on_simplex() {
        let json = r#"{
            "this_reputation": [2.0, 2.0],
            "smoothed_reputation": [1.0, 3.0],
            "sign_choice": "shifted",
            "reference_index": 0.0,
            "unchanged": false
        }"#;
        let reward: RewardWeights = serde_json::from_str(json).unwrap();
        assert_eq!(reward.this_reputation.as_slice(), &[0.5, 0.5]);
        assert_eq!(reward.smoothed_reputation.as_slice(), &[0.25, 0.75]);

        let bad = json.replace("[1.0, 3.0]", "[1.0, -3.0]");
        assert!(serde_json::from_str::<RewardWeights>(&bad).is_err());
    }

    #[test]
    fn test_invalid_alpha() {
        let filled = matrix(vec![vec![1.0]]);
        assert!(matches!(
            derive_reward(&[0.0], &Reputation::uniform(1), &filled, -0.1),
            Err(RoundError::InvalidParameter { name: "alpha", .. })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let filled = matrix(vec![vec![1.0], vec![0.0]]);
        assert!(matches!(
            derive_reward(&[0.0], &Reputation::uniform(2), &filled, 0.1),
            Err(RoundError::ReputationMismatch { .. })
        ));
    }
}
