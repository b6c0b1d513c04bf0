//! # Consensus Core
//!
//! Oracle round resolution for the weighted-consensus reputation engine.
//! Orchestrates the engine stages over one vote matrix and reports
//! outcomes, updated reputation and reward weights.
//!
//! ## What a round produces
//!
//! | Output | Meaning |
//! |--------|---------|
//! | `decision_outcomes_final` | One resolved value per decision |
//! | `smoothed_reputation` | Each reporter's weight for the next round |
//! | `row_bonus` / `col_bonus` | Reward split across reporters / decision authors |
//! | `certainty_per_decision` | How decisively each outcome was reached |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         CONSENSUS CORE                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                    ┌─────────────────┐                          │
//! │   RoundInput ────► │     Oracle      │ ────► RoundReport        │
//! │                    └────────┬────────┘                          │
//! │                             │                                   │
//! │         ┌───────────────────┼───────────────────┐               │
//! │         ▼                   ▼                   ▼               │
//! │  ┌─────────────┐    ┌─────────────┐    ┌───────────────┐        │
//! │  │  Rescale /  │    │  Loading /  │    │ Participation │        │
//! │  │   Impute    │    │   Reward    │    │    Scoring    │        │
//! │  └─────────────┘    └─────────────┘    └───────────────┘        │
//! │                consensus-engine  +  consensus-linalg            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use consensus_core::{Oracle, OracleConfig, RoundInput};
//!
//! let oracle = Oracle::new(OracleConfig::default())?;
//! let round = RoundInput::binary(vec![
//!     vec![Some(1.0), Some(1.0)],
//!     vec![Some(1.0), None],
//!     vec![Some(0.0), Some(0.0)],
//! ]);
//! let report = oracle.resolve(&round)?;
//!
//! // Feed the smoothed reputation into the next round.
//! let next = RoundInput::binary(vec![vec![Some(1.0)]; 3])
//!     .with_reputation(report.smoothed_reputation.clone());
//! oracle.resolve(&next)?;
//! # Ok::<(), consensus_core::OracleError>(())
//! ```
//!
//! ## Notes
//!
//! - Stages run in a fixed order: validate, rescale, impute, estimate,
//!   extract, reward, resolve, score
//! - Every input error is raised before any numeric stage runs
//! - No state is kept between rounds; the caller carries reputation forward
//!
//! ## References
//!
//! - Sztorc, P. *Truthcoin: Peer-to-Peer Oracle System and Prediction Marketplace*, 2015

mod config;
mod error;
mod oracle;
mod report;

pub use config::OracleConfig;
pub use error::OracleError;
pub use oracle::{resolve, Oracle, Stage};
pub use report::{DecisionSummary, ReporterSummary, RoundInput, RoundReport};

// Re-export component types for convenience
pub use consensus_engine::{DecisionBound, ErrorKind, RoundError, SignChoice};
pub use consensus_linalg::EigenBackend;

/// Core result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;

#[cfg(test)]
mod tests;
