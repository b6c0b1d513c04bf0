//! Weighted column statistics.
//!
//! The covariance uses reliability weights in floating point:
//!
//! ```text
//! Cov = Xᵗ · diag(w) · X / (V1 - V2 / V1),   V1 = Σw,  V2 = Σw²
//! ```
//!
//! where `X` is the matrix centred on the weighted column means. This is
//! the unbiased estimator for weights that express relative importance
//! rather than frequency counts. When one row carries all the weight the
//! correction term vanishes and the divisor falls back to `V1`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LinalgError, Result};
use crate::matrix::{Matrix, SymmetricMatrix};

/// Output of [`weighted_covariance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCovariance {
    /// Weighted mean of each column.
    pub mean: Vec<f64>,
    /// Input matrix minus the column means.
    pub centered: Matrix,
    /// Decision-by-decision weighted covariance.
    pub covariance: SymmetricMatrix,
}

/// Checks `weights` against `rows` and returns them scaled to sum to 1.
///
/// A vector of all zeros is treated as equal weighting.
pub fn normalized_weights(weights: &[f64], rows: usize) -> Result<Vec<f64>> {
    if weights.len() != rows {
        return Err(LinalgError::DimensionMismatch {
            operation: "weights",
            expected: rows,
            actual: weights.len(),
        });
    }
    for (index, &value) in weights.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(LinalgError::InvalidWeight { index, value });
        }
    }

    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        debug!("all weights are zero, using equal weights");
        return Ok(vec![1.0 / rows as f64; rows]);
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// Weighted mean of every column.
///
/// Each mean is clamped into its column's range, so a constant column has
/// exactly its constant as mean and centres to exact zeros.
pub fn weighted_mean(m: &Matrix, weights: &[f64]) -> Result<Vec<f64>> {
    let w = normalized_weights(weights, m.rows())?;
    let sums = m.weighted_column_sums(&w)?;
    Ok(sums
        .into_iter()
        .enumerate()
        .map(|(j, mean)| {
            let column = m.column(j);
            let lo = column.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            mean.clamp(lo, hi)
        })
        .collect())
}

/// Computes the weighted mean, centred matrix and weighted covariance.
///
/// # Example
///
/// ```rust
/// use consensus_linalg::{weighted_covariance, Matrix};
///
/// let m = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]])?;
/// let cov = weighted_covariance(&m, &[0.5, 0.5])?;
/// assert_eq!(cov.mean, vec![0.5, 0.5]);
/// assert!(cov.covariance.as_matrix()[(0, 1)] < 0.0);
/// # Ok::<(), consensus_linalg::LinalgError>(())
/// ```
pub fn weighted_covariance(m: &Matrix, weights: &[f64]) -> Result<WeightedCovariance> {
    if m.rows() == 0 || m.cols() == 0 {
        return Err(LinalgError::Empty {
            rows: m.rows(),
            cols: m.cols(),
        });
    }
    let w = normalized_weights(weights, m.rows())?;
    let mean = weighted_mean(m, &w)?;

    let mut centered = Matrix::zeros(m.rows(), m.cols());
    for i in 0..m.rows() {
        for j in 0..m.cols() {
            centered[(i, j)] = m[(i, j)] - mean[j];
        }
    }

    let v1: f64 = w.iter().sum();
    let v2: f64 = w.iter().map(|x| x * x).sum();
    let correction = v1 - v2 / v1;
    let divisor = if correction > f64::EPSILON { correction } else { v1 };

    let n = m.cols();
    let mut cov = Matrix::zeros(n, n);
    for (row, &weight) in centered.iter_rows().zip(&w) {
        if weight == 0.0 {
            continue;
        }
        for a in 0..n {
            let wa = weight * row[a];
            for b in a..n {
                cov[(a, b)] += wa * row[b];
            }
        }
    }
    for a in 0..n {
        for b in a..n {
            let value = cov[(a, b)] / divisor;
            cov[(a, b)] = value;
            cov[(b, a)] = value;
        }
    }

    Ok(WeightedCovariance {
        mean,
        centered,
        covariance: SymmetricMatrix::new(cov)?,
    })
}
