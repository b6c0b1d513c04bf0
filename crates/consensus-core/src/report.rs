//! Round inputs and the resolved report.

use consensus_engine::{DecisionBound, SignChoice, VoteMatrix};
use serde::{Deserialize, Serialize};

use crate::config::OracleConfig;

/// One round to resolve.
///
/// JSON encodes missing votes as `null`:
///
/// ```json
/// {
///   "votes": [[1.0, null], [0.0, 1.0]],
///   "bounds": [{}, {"is_scaled": true, "min": 0, "max": 100}],
///   "old_reputation": [0.5, 0.5]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundInput {
    /// Reporter × decision votes in native units.
    pub votes: Vec<Vec<Option<f64>>>,
    /// One bound per decision.
    pub bounds: Vec<DecisionBound>,
    /// Prior reputation; uniform when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_reputation: Option<Vec<f64>>,
}

impl RoundInput {
    /// A round of binary decisions with a uniform prior.
    pub fn binary(votes: Vec<Vec<Option<f64>>>) -> Self {
        let decisions = votes.first().map_or(0, Vec::len);
        Self {
            votes,
            bounds: vec![DecisionBound::binary(); decisions],
            old_reputation: None,
        }
    }

    /// Sets the prior reputation.
    #[must_use]
    pub fn with_reputation(mut self, reputation: Vec<f64>) -> Self {
        self.old_reputation = Some(reputation);
        self
    }
}

/// Everything a resolved round produced.
///
/// Outcome vectors named `_prior` and `_raw` are on the [0, 1] working
/// scale; `decision_outcomes_final` is in each decision's native units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// The votes as submitted.
    pub original: VoteMatrix,
    /// Rescaled votes with every gap imputed.
    pub filled: Vec<Vec<f64>>,
    /// Outcomes under the old reputation.
    pub decision_outcomes_prior: Vec<f64>,
    /// Outcomes under the smoothed reputation, before catch and unscale.
    pub decision_outcomes_raw: Vec<f64>,
    /// Resolved outcomes: binary caught onto {0, 0.5, 1}, scaled unscaled.
    pub decision_outcomes_final: Vec<f64>,
    /// `|2 (raw − 0.5)|` per decision.
    pub certainty_per_decision: Vec<f64>,
    /// Mean of `certainty_per_decision`.
    pub avg_certainty: f64,
    /// Reputation the round started from.
    pub old_reputation: Vec<f64>,
    /// Reputation implied by this round alone.
    pub this_reputation: Vec<f64>,
    /// Blend of `this` and `old`; the next round's prior.
    pub smoothed_reputation: Vec<f64>,
    /// Dominant eigenvector of the weighted covariance.
    pub first_loading: Vec<f64>,
    /// Projection of each reporter onto `first_loading`.
    pub first_score: Vec<f64>,
    /// Orientation of `first_score` that was kept.
    pub sign_choice: SignChoice,
    /// Squared-error difference that decided `sign_choice`.
    pub reference_index: f64,
    /// True when votes carried no signal and reputation was left unchanged.
    pub reputation_unchanged: bool,
    /// Share of smoothed reputation that voted on each decision.
    pub participation_per_decision: Vec<f64>,
    /// Share of decisions each reporter voted on.
    pub participation_per_reporter: Vec<f64>,
    /// Reporter reward weights.
    pub row_bonus: Vec<f64>,
    /// Decision-author reward weights.
    pub col_bonus: Vec<f64>,
    /// `1 − mean(participation_per_decision)`.
    pub percent_missing: f64,
    /// Parameters the round was resolved with.
    pub config: OracleConfig,
}

/// One reporter's row of a [`RoundReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterSummary {
    pub reporter: usize,
    pub old_reputation: f64,
    pub this_reputation: f64,
    pub smoothed_reputation: f64,
    pub first_score: f64,
    pub participation: f64,
    pub row_bonus: f64,
    pub votes_missing: usize,
}

/// One decision's column of a [`RoundReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub decision: usize,
    pub outcome_prior: f64,
    pub outcome_raw: f64,
    pub outcome_final: f64,
    pub certainty: f64,
    pub participation: f64,
    pub col_bonus: f64,
    pub loading: f64,
}

impl RoundReport {
    /// Number of reporters.
    pub fn reporters(&self) -> usize {
        self.old_reputation.len()
    }

    /// Number of decisions.
    pub fn decisions(&self) -> usize {
        self.decision_outcomes_final.len()
    }

    /// Per-reporter view, or `None` if `reporter` is out of range.
    ///
    /// A report edited by hand may carry vectors of different lengths; any
    /// vector too short for `reporter` also yields `None`.
    pub fn reporter_summary(&self, reporter: usize) -> Option<ReporterSummary> {
        Some(ReporterSummary {
            reporter,
            old_reputation: *self.old_reputation.get(reporter)?,
            this_reputation: *self.this_reputation.get(reporter)?,
            smoothed_reputation: *self.smoothed_reputation.get(reporter)?,
            first_score: *self.first_score.get(reporter)?,
            participation: *self.participation_per_reporter.get(reporter)?,
            row_bonus: *self.row_bonus.get(reporter)?,
            votes_missing: self.original.missing_in_row(reporter)?,
        })
    }

    /// Per-decision view, or `None` if `decision` is out of range.
    pub fn decision_summary(&self, decision: usize) -> Option<DecisionSummary> {
        Some(DecisionSummary {
            decision,
            outcome_prior: *self.decision_outcomes_prior.get(decision)?,
            outcome_raw: *self.decision_outcomes_raw.get(decision)?,
            outcome_final: *self.decision_outcomes_final.get(decision)?,
            certainty: *self.certainty_per_decision.get(decision)?,
            participation: *self.participation_per_decision.get(decision)?,
            col_bonus: *self.col_bonus.get(decision)?,
            loading: *self.first_loading.get(decision)?,
        })
    }

    /// Returns true if the round took the no-signal branch: every filled
    /// vote agreed, so reputation carried over unchanged.
    pub fn is_unanimous(&self) -> bool {
        self.reputation_unchanged
    }
}
