//! # Consensus Linear Algebra
//!
//! The numeric kernel of the reputation engine: dense matrices, weighted
//! covariance and the dominant eigenvector of a symmetric matrix.
//!
//! No BLAS or LAPACK binding is assumed. Matrices in an oracle round are
//! small (decisions × decisions for the covariance), so plain row-major
//! storage and a Jacobi solver are sufficient and fully deterministic.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`Matrix`] | Dense row-major storage and products |
//! | [`SymmetricMatrix`] | Checked symmetric wrapper for solvers |
//! | [`weighted_covariance`] | Reliability-weighted covariance and centring |
//! | [`EigenSolver`] | Dominant eigenpair interface |
//! | [`JacobiSolver`] / [`PowerIteration`] | Swappable solver backends |
//!
//! ## Quick Start
//!
//! ```rust
//! use consensus_linalg::{weighted_covariance, EigenSolver, JacobiSolver, Matrix};
//!
//! let votes = Matrix::from_rows(vec![
//!     vec![1.0, 1.0],
//!     vec![1.0, 1.0],
//!     vec![0.0, 0.0],
//! ])?;
//! let cov = weighted_covariance(&votes, &[1.0 / 3.0; 3])?;
//! let pair = JacobiSolver::default().dominant_eigenvector(&cov.covariance)?;
//!
//! // Both decisions move together, so the loading weights them equally.
//! assert!((pair.vector[0] - pair.vector[1]).abs() < 1e-12);
//! # Ok::<(), consensus_linalg::LinalgError>(())
//! ```
//!
//! ## References
//!
//! - Golub, G. H. & Van Loan, C. F. *Matrix Computations*, §8.5 (Jacobi methods).

mod covariance;
mod eigen;
mod error;
mod matrix;

pub use covariance::{normalized_weights, weighted_covariance, weighted_mean, WeightedCovariance};
pub use eigen::{canonicalize_sign, EigenBackend, EigenPair, EigenSolver, JacobiSolver, PowerIteration};
pub use error::{LinalgError, Result};
pub use matrix::{dot, norm, Matrix, SymmetricMatrix};
