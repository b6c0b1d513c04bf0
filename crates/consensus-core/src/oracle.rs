//! The oracle facade.
//!
//! [`Oracle`] runs one round through every engine stage in a fixed order
//! and packages the results into a [`RoundReport`].

use std::fmt;

use consensus_engine::{
    catch, derive_reward, estimate_filled, extract, impute, rescale, score_participation,
    validate_votes, DecisionBound, Reputation, VoteMatrix,
};
use consensus_linalg::EigenSolver;
use tracing::{debug, info};

use crate::{
    config::OracleConfig,
    report::{RoundInput, RoundReport},
    Result,
};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Rescaling,
    Imputing,
    EstimatingOutcome,
    ExtractingLoading,
    DerivingReward,
    Resolving,
    ScoringParticipation,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Rescaling => "rescaling",
            Self::Imputing => "imputing",
            Self::EstimatingOutcome => "estimating-outcome",
            Self::ExtractingLoading => "extracting-loading",
            Self::DerivingReward => "deriving-reward",
            Self::Resolving => "resolving",
            Self::ScoringParticipation => "scoring-participation",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Resolves oracle rounds.
///
/// An `Oracle` holds only its configuration and eigensolver; rounds share
/// no state, so one instance can serve any number of threads.
///
/// # Example
///
/// ```rust
/// use consensus_core::{Oracle, OracleConfig, RoundInput};
///
/// let oracle = Oracle::new(OracleConfig::default())?;
/// let report = oracle.resolve(&RoundInput::binary(vec![
///     vec![Some(1.0), Some(0.0)],
///     vec![Some(1.0), Some(0.0)],
///     vec![Some(0.0), Some(1.0)],
/// ]))?;
///
/// assert_eq!(report.decision_outcomes_final, vec![1.0, 0.0]);
/// # Ok::<(), consensus_core::OracleError>(())
/// ```
#[derive(Debug)]
pub struct Oracle {
    config: OracleConfig,
    solver: Box<dyn EigenSolver>,
}

impl Oracle {
    /// Creates an oracle with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: OracleConfig) -> Result<Self> {
        config.validate()?;
        let solver = config.solver();
        debug!(?config, "oracle initialized");
        Ok(Self { config, solver })
    }

    /// The active configuration.
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Validates a round without resolving it.
    ///
    /// Runs exactly the checks [`Oracle::resolve`] runs before any numeric
    /// stage.
    pub fn check(&self, input: &RoundInput) -> Result<()> {
        self.validate(input).map(|_| ())
    }

    fn validate(&self, input: &RoundInput) -> Result<(VoteMatrix, Reputation)> {
        let votes = VoteMatrix::new(input.votes.clone())?;
        validate_votes(&votes, &input.bounds)?;
        let old = Reputation::prior(input.old_reputation.as_deref(), votes.reporters())?;
        Ok((votes, old))
    }

    /// Resolves one round.
    ///
    /// # Errors
    ///
    /// Any invalid input is reported before the numeric stages start:
    /// ragged or empty votes, bad bounds, votes outside their bounds, a
    /// decision nobody voted on, or a malformed prior reputation.
    pub fn resolve(&self, input: &RoundInput) -> Result<RoundReport> {
        let bounds = input.bounds.as_slice();
        let catch_p = self.config.catch_p;

        enter(Stage::Validating);
        let (votes, old) = self.validate(input)?;

        enter(Stage::Rescaling);
        let scaled = rescale(&votes, bounds)?;

        enter(Stage::Imputing);
        let filled = impute(&scaled, bounds, &old, catch_p)?;

        enter(Stage::EstimatingOutcome);
        let prior = estimate_filled(&filled, bounds, &old)?;

        enter(Stage::ExtractingLoading);
        let loading = extract(&filled, &old, self.solver.as_ref())?;

        enter(Stage::DerivingReward);
        let reward = derive_reward(&loading.first_score, &old, &filled, self.config.alpha)?;

        enter(Stage::Resolving);
        let raw = estimate_filled(&filled, bounds, &reward.smoothed_reputation)?;
        let resolved = finalize(&raw, bounds, catch_p);
        let certainty: Vec<f64> = raw.iter().map(|r| (2.0 * (r - 0.5)).abs()).collect();
        let avg_certainty = certainty.iter().sum::<f64>() / certainty.len() as f64;

        enter(Stage::ScoringParticipation);
        let participation = score_participation(&votes.missing_mask(), &reward, &certainty)?;

        enter(Stage::Done);
        info!(
            reporters = votes.reporters(),
            decisions = votes.decisions(),
            missing = votes.missing_count(),
            avg_certainty,
            percent_missing = participation.percent_na,
            sign = ?reward.sign_choice,
            unchanged = reward.unchanged,
            "round resolved"
        );

        Ok(RoundReport {
            filled: filled.to_rows(),
            original: votes,
            decision_outcomes_prior: prior,
            decision_outcomes_raw: raw,
            decision_outcomes_final: resolved,
            certainty_per_decision: certainty,
            avg_certainty,
            old_reputation: old.into_vec(),
            this_reputation: reward.this_reputation.into_vec(),
            smoothed_reputation: reward.smoothed_reputation.into_vec(),
            first_loading: loading.first_loading,
            first_score: loading.first_score,
            sign_choice: reward.sign_choice,
            reference_index: reward.reference_index,
            reputation_unchanged: reward.unchanged,
            participation_per_decision: participation.per_decision,
            participation_per_reporter: participation.per_reporter,
            row_bonus: participation.row_bonus,
            col_bonus: participation.col_bonus,
            percent_missing: participation.percent_na,
            config: self.config,
        })
    }

    /// Resolves a sequence of rounds in order.
    ///
    /// A round without its own `old_reputation` starts from the previous
    /// round's smoothed reputation. Stops at the first failing round.
    pub fn resolve_rounds(&self, rounds: &[RoundInput]) -> Result<Vec<RoundReport>> {
        let mut reports: Vec<RoundReport> = Vec::with_capacity(rounds.len());
        for (index, round) in rounds.iter().enumerate() {
            let report = match (&round.old_reputation, reports.last()) {
                (None, Some(previous)) => {
                    let mut chained = round.clone();
                    chained.old_reputation = Some(previous.smoothed_reputation.clone());
                    self.resolve(&chained)?
                }
                _ => self.resolve(round)?,
            };
            debug!(round = index, "chained round resolved");
            reports.push(report);
        }
        Ok(reports)
    }
}

fn enter(stage: Stage) {
    debug!(%stage, "entering stage");
}

/// Catches binary outcomes and maps scaled outcomes back to native units.
fn finalize(raw: &[f64], bounds: &[DecisionBound], catch_p: f64) -> Vec<f64> {
    raw.iter()
        .zip(bounds)
        .map(|(&r, bound)| {
            if bound.is_scaled {
                bound.unscale(r)
            } else {
                catch(r, catch_p)
            }
        })
        .collect()
}

/// Resolves one round with the default configuration.
///
/// # Example
///
/// ```rust
/// use consensus_core::{resolve, DecisionBound};
///
/// let report = resolve(
///     vec![vec![Some(1.0), Some(40.0)], vec![Some(1.0), None]],
///     vec![DecisionBound::binary(), DecisionBound::scaled(0.0, 100.0)],
///     None,
/// )?;
/// assert_eq!(report.decision_outcomes_final[0], 1.0);
/// assert!((report.decision_outcomes_final[1] - 40.0).abs() < 1e-9);
/// # Ok::<(), consensus_core::OracleError>(())
/// ```
pub fn resolve(
    votes: Vec<Vec<Option<f64>>>,
    bounds: Vec<DecisionBound>,
    old_reputation: Option<Vec<f64>>,
) -> Result<RoundReport> {
    Oracle::new(OracleConfig::default())?.resolve(&RoundInput {
        votes,
        bounds,
        old_reputation,
    })
}
