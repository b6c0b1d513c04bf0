//! Configuration types for the oracle.

use std::path::Path;

use consensus_engine::{DEFAULT_ALPHA, DEFAULT_CATCH_P};
use consensus_linalg::{EigenBackend, EigenSolver};
use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::Result;

/// Tuning parameters for resolving a round.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```toml
/// catch_p = 0.2
/// eigen_backend = "power"
/// ```
///
/// # Example
///
/// ```rust
/// use consensus_core::{EigenBackend, OracleConfig};
///
/// let config = OracleConfig::new()
///     .with_alpha(0.2)
///     .with_eigen_backend(EigenBackend::Power);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Width of the ambiguous band around 0.5 for binary outcomes.
    pub catch_p: f64,
    /// Weight of this round's reputation in the smoothed reputation.
    pub alpha: f64,
    /// Eigensolver used to extract the first loading.
    pub eigen_backend: EigenBackend,
    /// Convergence tolerance of the eigensolver.
    pub solver_tolerance: f64,
    /// Sweep cap (Jacobi) or iteration cap (power iteration).
    pub max_iterations: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleConfig {
    /// Creates a config with default values.
    ///
    /// Defaults:
    /// - `catch_p`: 0.1
    /// - `alpha`: 0.1
    /// - `eigen_backend`: Jacobi
    /// - `solver_tolerance`: 1e-12
    /// - `max_iterations`: 10,000
    #[must_use]
    pub const fn new() -> Self {
        Self {
            catch_p: DEFAULT_CATCH_P,
            alpha: DEFAULT_ALPHA,
            eigen_backend: EigenBackend::Jacobi,
            solver_tolerance: 1e-12,
            max_iterations: 10_000,
        }
    }

    /// Sets the catch tolerance.
    #[must_use]
    pub const fn with_catch_p(mut self, catch_p: f64) -> Self {
        self.catch_p = catch_p;
        self
    }

    /// Sets the smoothing factor.
    #[must_use]
    pub const fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the eigensolver backend.
    #[must_use]
    pub const fn with_eigen_backend(mut self, backend: EigenBackend) -> Self {
        self.eigen_backend = backend;
        self
    }

    /// Sets the eigensolver tolerance.
    #[must_use]
    pub const fn with_solver_tolerance(mut self, tolerance: f64) -> Self {
        self.solver_tolerance = tolerance;
        self
    }

    /// Sets the eigensolver iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Checks every parameter's range.
    ///
    /// # Errors
    ///
    /// [`OracleError::Config`] naming the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.catch_p) {
            return Err(OracleError::Config(format!(
                "catch_p must lie in [0, 1], got {}",
                self.catch_p
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(OracleError::Config(format!(
                "alpha must lie in [0, 1], got {}",
                self.alpha
            )));
        }
        if !(self.solver_tolerance > 0.0 && self.solver_tolerance.is_finite()) {
            return Err(OracleError::Config(format!(
                "solver_tolerance must be positive, got {}",
                self.solver_tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(OracleError::Config("max_iterations must be at least 1".into()));
        }
        Ok(())
    }

    /// Builds the configured eigensolver.
    pub fn solver(&self) -> Box<dyn EigenSolver> {
        self.eigen_backend
            .solver(self.solver_tolerance, self.max_iterations)
    }

    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| OracleError::Parse(e.to_string()))
    }

    /// Parses a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| OracleError::Parse(e.to_string()))
    }

    /// Loads a config file; `.json` files are parsed as JSON, anything
    /// else as TOML. The result is validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text)?,
            _ => Self::from_toml_str(&text)?,
        };
        config.validate()?;
        Ok(config)
    }
}
