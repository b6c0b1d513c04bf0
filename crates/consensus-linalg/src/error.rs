//! Error types for the linear-algebra routines.
//!
//! Provides structured error handling for matrix construction,
//! weighted covariance and eigen-decomposition.

use thiserror::Error;

/// Result type alias for linear-algebra operations.
pub type Result<T> = std::result::Result<T, LinalgError>;

/// Errors that can occur while building matrices or solving for eigenpairs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinalgError {
    /// The operation needs at least one row and one column.
    #[error("matrix is empty ({rows}x{cols})")]
    Empty {
        /// Number of rows supplied
        rows: usize,
        /// Number of columns supplied
        cols: usize,
    },

    /// A square matrix was required.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Operand dimensions do not line up.
    #[error("dimension mismatch in {operation}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Operation that was attempted
        operation: &'static str,
        /// Expected length
        expected: usize,
        /// Length actually supplied
        actual: usize,
    },

    /// A NaN or infinite value was found.
    #[error("non-finite value {value} at ({row}, {col})")]
    NonFinite {
        /// Row of the offending entry
        row: usize,
        /// Column of the offending entry
        col: usize,
        /// The offending value
        value: f64,
    },

    /// A matrix expected to be symmetric is not.
    #[error("matrix is not symmetric: ({row}, {col}) differs from its transpose by {delta}")]
    NotSymmetric {
        /// Row of the first asymmetric pair found
        row: usize,
        /// Column of the first asymmetric pair found
        col: usize,
        /// Absolute difference between the mirrored entries
        delta: f64,
    },

    /// A weight vector contains a negative or non-finite entry.
    #[error("invalid weight {value} at index {index}")]
    InvalidWeight {
        /// Index of the offending weight
        index: usize,
        /// The offending weight
        value: f64,
    },

    /// An iterative solver ran out of iterations.
    #[error("{solver} did not converge within {iterations} iterations (residual {residual:e})")]
    NoConvergence {
        /// Name of the solver
        solver: &'static str,
        /// Iteration cap that was hit
        iterations: usize,
        /// Residual at the last iteration
        residual: f64,
    },
}
