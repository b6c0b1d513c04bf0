//! Error types for the reputation engine.
//!
//! Every fatal precondition names the reporter and/or decision it concerns,
//! since a miscomputed consensus has financial consequences and the caller
//! must be able to locate the bad input.

use consensus_linalg::LinalgError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad class of a [`RoundError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Invalid round configuration or input values.
    Configuration,
    /// Input collections whose lengths disagree.
    InputShape,
    /// A numeric routine failed on validated input.
    Numeric,
}

/// Errors raised while validating or resolving a round.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundError {
    /// The vote matrix has no rows.
    #[error("round has no reporters")]
    NoReporters,

    /// The vote matrix has no columns.
    #[error("round has no decisions")]
    NoDecisions,

    /// A scaled decision declares `max == min`.
    #[error("decision {decision}: scaled bounds have zero span (min = max = {min})")]
    ZeroSpan {
        /// Offending decision index
        decision: usize,
        /// Declared minimum
        min: f64,
        /// Declared maximum
        max: f64,
    },

    /// A scaled decision declares `max < min`.
    #[error("decision {decision}: scaled bounds are inverted (min {min} > max {max})")]
    InvertedBounds {
        /// Offending decision index
        decision: usize,
        /// Declared minimum
        min: f64,
        /// Declared maximum
        max: f64,
    },

    /// A decision's bounds are NaN or infinite.
    #[error("decision {decision}: bounds must be finite")]
    NonFiniteBounds {
        /// Offending decision index
        decision: usize,
    },

    /// Nobody voted on a decision, so there is nothing to impute from.
    #[error("decision {decision}: no reporter voted")]
    EmptyDecision {
        /// Offending decision index
        decision: usize,
    },

    /// A vote is NaN or infinite.
    #[error("reporter {reporter}, decision {decision}: vote is not finite")]
    NonFiniteVote {
        /// Offending reporter index
        reporter: usize,
        /// Offending decision index
        decision: usize,
    },

    /// A vote lies outside its decision's declared range.
    #[error("reporter {reporter}, decision {decision}: vote {value} outside [{min}, {max}]")]
    VoteOutOfBounds {
        /// Offending reporter index
        reporter: usize,
        /// Offending decision index
        decision: usize,
        /// The vote
        value: f64,
        /// Decision minimum
        min: f64,
        /// Decision maximum
        max: f64,
    },

    /// A prior reputation entry is negative or not finite.
    #[error("reporter {reporter}: invalid reputation {value}")]
    InvalidReputation {
        /// Offending reporter index
        reporter: usize,
        /// The reputation value
        value: f64,
    },

    /// A tuning parameter is out of range.
    #[error("parameter {name} = {value} is invalid: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Supplied value
        value: f64,
        /// Why it was rejected
        reason: &'static str,
    },

    /// `bounds.len()` differs from the number of decisions.
    #[error("expected {expected} decision bounds, got {actual}")]
    BoundsMismatch {
        /// Number of decisions in the vote matrix
        expected: usize,
        /// Number of bounds supplied
        actual: usize,
    },

    /// The prior reputation length differs from the number of reporters.
    #[error("expected {expected} reputation entries, got {actual}")]
    ReputationMismatch {
        /// Number of reporters in the vote matrix
        expected: usize,
        /// Number of reputation entries supplied
        actual: usize,
    },

    /// A row of the vote matrix has the wrong length.
    #[error("reporter {reporter}: expected {expected} votes, got {actual}")]
    RaggedRow {
        /// Offending reporter index
        reporter: usize,
        /// Expected row length
        expected: usize,
        /// Actual row length
        actual: usize,
    },

    /// A linear-algebra routine failed.
    #[error("numeric failure: {0}")]
    Numeric(#[from] LinalgError),
}

impl RoundError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BoundsMismatch { .. } | Self::ReputationMismatch { .. } | Self::RaggedRow { .. } => {
                ErrorKind::InputShape
            }
            Self::Numeric(_) => ErrorKind::Numeric,
            _ => ErrorKind::Configuration,
        }
    }
}
