//! Participation scoring and bonus distribution.
//!
//! When many votes are missing, statistical agreement says little about
//! who did the work, so rewards lean on raw participation instead. Both
//! bonuses are convex blends controlled by the overall share of missing
//! reputation, `percent_na`:
//!
//! ```text
//! row_bonus = normalize(participation_per_reporter) · percent_na
//!           + smoothed_reputation                   · (1 − percent_na)
//! col_bonus = normalize(participation_per_decision) · percent_na
//!           + normalize(certainty)                  · (1 − percent_na)
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RoundError;
use crate::reputation::normalize;
use crate::reward::RewardWeights;
use crate::Result;

/// Output of [`score_participation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    /// Share of smoothed reputation that voted on each decision.
    pub per_decision: Vec<f64>,
    /// Share of decisions each reporter voted on.
    pub per_reporter: Vec<f64>,
    /// `1 − mean(per_decision)`.
    pub percent_na: f64,
    /// Reporter reward weights, summing to 1.
    pub row_bonus: Vec<f64>,
    /// Decision-author reward weights, summing to 1.
    pub col_bonus: Vec<f64>,
}

/// Scores participation from the missing-vote mask of the original matrix.
///
/// `missing[i][j]` is true when reporter `i` did not vote on decision `j`.
///
/// # Errors
///
/// Shape mismatches between the mask, the reputation vectors and
/// `certainty`.
pub fn score_participation(
    missing: &[Vec<bool>],
    reward: &RewardWeights,
    certainty: &[f64],
) -> Result<Participation> {
    let smoothed = reward.smoothed_reputation.as_slice();
    let reporters = missing.len();
    let decisions = certainty.len();

    if smoothed.len() != reporters || reward.this_reputation.len() != reporters {
        return Err(RoundError::ReputationMismatch {
            expected: reporters,
            actual: smoothed.len(),
        });
    }
    if decisions == 0 {
        return Err(RoundError::NoDecisions);
    }
    for (reporter, row) in missing.iter().enumerate() {
        if row.len() != decisions {
            return Err(RoundError::RaggedRow {
                reporter,
                expected: decisions,
                actual: row.len(),
            });
        }
    }

    let per_decision: Vec<f64> = (0..decisions)
        .map(|j| {
            let absent: f64 = missing
                .iter()
                .zip(smoothed)
                .filter(|(row, _)| row[j])
                .map(|(_, w)| w)
                .sum();
            (1.0 - absent).clamp(0.0, 1.0)
        })
        .collect();

    let per_reporter: Vec<f64> = missing
        .iter()
        .map(|row| {
            let absent = row.iter().filter(|m| **m).count();
            1.0 - absent as f64 / decisions as f64
        })
        .collect();

    let mean_participation = per_decision.iter().sum::<f64>() / decisions as f64;
    let percent_na = (1.0 - mean_participation).clamp(0.0, 1.0);

    let row_bonus = blend(&normalize(&per_reporter), smoothed, percent_na);
    let col_bonus = blend(&normalize(&per_decision), &normalize(certainty), percent_na);

    debug!(percent_na, reporters, decisions, "scored participation");

    Ok(Participation {
        per_decision,
        per_reporter,
        percent_na,
        row_bonus,
        col_bonus,
    })
}

fn blend(participation: &[f64], merit: &[f64], percent_na: f64) -> Vec<f64> {
    participation
        .iter()
        .zip(merit)
        .map(|(p, m)| p * percent_na + m * (1.0 - percent_na))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reputation::Reputation;
    use crate::reward::SignChoice;

    fn reward(weights: &[f64]) -> RewardWeights {
        let rep = Reputation::from_weights(weights).unwrap();
        RewardWeights {
            this_reputation: rep.clone(),
            smoothed_reputation: rep,
            sign_choice: SignChoice::Shifted,
            reference_index: 0.0,
            unchanged: true,
        }
    }

    #[test]
    fn test_full_participation_defers_to_reputation() {
        let mask = vec![vec![false, false]; 2];
        let p = score_participation(&mask, &reward(&[0.7, 0.3]), &[1.0, 0.0]).unwrap();
        assert_eq!(p.per_decision, vec![1.0, 1.0]);
        assert_eq!(p.per_reporter, vec![1.0, 1.0]);
        assert_eq!(p.percent_na, 0.0);
        assert_eq!(p.row_bonus, vec![0.7, 0.3]);
        assert_eq!(p.col_bonus, vec![1.0, 0.0]);
    }

    #[test]
    fn test_missing_votes_shift_bonus_to_participants() {
        // Reporter 1 skipped decision 1.
        let mask = vec![vec![false, false], vec![false, true]];
        let p = score_participation(&mask, &reward(&[0.5, 0.5]), &[1.0, 1.0]).unwrap();

        assert_eq!(p.per_decision, vec![1.0, 0.5]);
        assert_eq!(p.per_reporter, vec![1.0, 0.5]);
        assert!((p.percent_na - 0.25).abs() < 1e-12);

        // normalize([1, 0.5]) = [2/3, 1/3]; blended with 0.5 each at 25%.
        assert!((p.row_bonus[0] - (2.0 / 3.0 * 0.25 + 0.5 * 0.75)).abs() < 1e-12);
        assert!(p.row_bonus[0] > p.row_bonus[1]);
        assert!((p.row_bonus.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((p.col_bonus.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_certainty_rewards_equally() {
        let mask = vec![vec![false, false, false]];
        let p = score_participation(&mask, &reward(&[1.0]), &[0.0, 0.0, 0.0]).unwrap();
        for b in &p.col_bonus {
            assert!((b - 1.0 / 3.0).abs() < 1e-15);
        }
    }

    #[test]
    fn test_shape_checked() {
        let mask = vec![vec![false, false]];
        assert!(matches!(
            score_participation(&mask, &reward(&[1.0]), &[1.0]),
            Err(RoundError::RaggedRow { reporter: 0, expected: 1, actual: 2 })
        ));
    }
}
