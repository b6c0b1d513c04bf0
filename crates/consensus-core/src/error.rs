//! Error types for the oracle facade.

use consensus_engine::{ErrorKind, RoundError};
use thiserror::Error;

/// Core error type for oracle operations.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The round could not be resolved.
    #[error("Round error: {0}")]
    Round(#[from] RoundError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A config or round file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config or round document is malformed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OracleError {
    /// Broad class of the error. I/O and parse failures count as
    /// configuration problems.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Round(e) => e.kind(),
            Self::Config(_) | Self::Io(_) | Self::Parse(_) => ErrorKind::Configuration,
        }
    }
}
