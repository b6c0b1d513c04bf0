//! # Consensus Engine
//!
//! Pipeline stages of the weighted-consensus reputation engine. Reporters
//! vote on decisions; agreement with the reputation-weighted consensus,
//! measured along the first principal component, earns reputation.
//!
//! ## Overview
//!
//! A round is a reporter × decision [`VoteMatrix`] with optional missing
//! cells, one [`DecisionBound`] per decision and a prior [`Reputation`].
//! Each stage is a pure function over immutable inputs; the facade in
//! `consensus-core` chains them and owns configuration.
//!
//! ## Threat Model
//!
//! ### Lazy or strategic abstention
//! Missing votes are filled with the prior consensus, so skipping a
//! decision neither helps nor hurts the consensus itself. Participation
//! still feeds the bonus split once missingness is significant.
//!
//! ### Minority manipulation of scaled decisions
//! Scaled outcomes use the weighted median. A bloc holding less than half
//! of the reputation cannot move it by reporting extreme values.
//!
//! ### Sybil splitting
//! The reputation update rescales by `old / mean(old)`, so splitting a
//! stake across many identities that vote alike earns the same total as
//! holding it in one.
//!
//! ## Pipeline
//!
//! ```text
//!  raw votes ──► rescale ──► impute ──► extract ──► derive_reward
//!                              │          (first        │
//!                              │          loading)      ▼
//!                              └──────────────────► estimate ──► catch/unscale
//!                                                       │
//!                                                       ▼
//!                                               score_participation
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use consensus_engine::{
//!     derive_reward, extract, impute, rescale, DecisionBound, Reputation, VoteMatrix,
//! };
//! use consensus_linalg::JacobiSolver;
//!
//! let raw = VoteMatrix::new(vec![
//!     vec![Some(1.0), Some(1.0)],
//!     vec![Some(1.0), None],
//!     vec![Some(0.0), Some(0.0)],
//! ])?;
//! let bounds = [DecisionBound::binary(); 2];
//! let old = Reputation::uniform(3);
//!
//! let scaled = rescale(&raw, &bounds)?;
//! let filled = impute(&scaled, &bounds, &old, 0.1)?;
//! let loading = extract(&filled, &old, &JacobiSolver::default())?;
//! let reward = derive_reward(&loading.first_score, &old, &filled, 0.1)?;
//!
//! // The dissenter ends the round with less than its prior share.
//! assert!(reward.this_reputation.as_slice()[2] < 1.0 / 3.0);
//! # Ok::<(), consensus_engine::RoundError>(())
//! ```
//!
//! ## References
//!
//! - Sztorc, P. *Truthcoin: Peer-to-Peer Oracle System and Prediction Marketplace*, 2015

pub mod bounds;
pub mod error;
pub mod impute;
pub mod loading;
pub mod outcome;
pub mod participation;
pub mod reputation;
pub mod reward;
pub mod validate;
pub mod votes;

pub use bounds::{rescale, validate_bounds, DecisionBound};
pub use error::{ErrorKind, RoundError};
pub use impute::impute;
pub use loading::{extract, Loading};
pub use outcome::{
    catch, estimate, estimate_column, estimate_filled, weighted_mean, weighted_median, DEFAULT_CATCH_P,
    MEDIAN_TOLERANCE,
};
pub use participation::{score_participation, Participation};
pub use reputation::{normalize, Reputation};
pub use reward::{derive_reward, RewardWeights, SignChoice, DEFAULT_ALPHA};
pub use validate::validate_votes;
pub use votes::VoteMatrix;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, RoundError>;
