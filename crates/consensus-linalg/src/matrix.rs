//! Dense row-major matrices.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::{LinalgError, Result};

/// A dense, row-major matrix of `f64`.
///
/// Shapes are fixed at construction. Every arithmetic helper returns a new
/// owned value; nothing mutates its receiver except the explicit
/// [`IndexMut`] access.
///
/// # Example
///
/// ```rust
/// use consensus_linalg::Matrix;
///
/// let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]])?;
/// assert_eq!(m[(1, 0)], 3.0);
/// assert_eq!(m.mul_vec(&[1.0, 1.0])?, vec![3.0, 7.0]);
/// # Ok::<(), consensus_linalg::LinalgError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Builds a matrix from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::Empty`] for zero rows or columns,
    /// [`LinalgError::DimensionMismatch`] for ragged rows and
    /// [`LinalgError::NonFinite`] for NaN or infinite entries.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if n_rows == 0 || n_cols == 0 {
            return Err(LinalgError::Empty {
                rows: n_rows,
                cols: n_cols,
            });
        }

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(LinalgError::DimensionMismatch {
                    operation: "from_rows",
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            for (j, value) in row.into_iter().enumerate() {
                if !value.is_finite() {
                    return Err(LinalgError::NonFinite {
                        row: i,
                        col: j,
                        value,
                    });
                }
                data.push(value);
            }
        }

        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true if the matrix is square.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Borrows row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Copies column `j` out.
    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self[(i, j)]).collect()
    }

    /// Iterates over rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.cols.max(1)).take(self.rows)
    }

    /// Converts back into nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }

    /// Computes `M · v` (one value per row).
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>> {
        if v.len() != self.cols {
            return Err(LinalgError::DimensionMismatch {
                operation: "mul_vec",
                expected: self.cols,
                actual: v.len(),
            });
        }
        Ok(self.iter_rows().map(|row| dot(row, v)).collect())
    }

    /// Computes `wᵗ · M` (one value per column).
    ///
    /// With `w` on the probability simplex this is the per-column
    /// weighted average.
    pub fn weighted_column_sums(&self, w: &[f64]) -> Result<Vec<f64>> {
        if w.len() != self.rows {
            return Err(LinalgError::DimensionMismatch {
                operation: "weighted_column_sums",
                expected: self.rows,
                actual: w.len(),
            });
        }
        let mut out = vec![0.0; self.cols];
        for (row, &weight) in self.iter_rows().zip(w) {
            for (acc, &x) in out.iter_mut().zip(row) {
                *acc += weight * x;
            }
        }
        Ok(out)
    }

    /// Largest absolute entry, or 0 for an all-zero matrix.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

/// A square matrix known to be symmetric.
///
/// Construction checks symmetry within a relative tolerance and then
/// averages mirrored entries so downstream solvers see an exactly
/// symmetric input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetricMatrix(Matrix);

impl SymmetricMatrix {
    const SYMMETRY_TOLERANCE: f64 = 1e-9;

    /// Wraps `m` after checking it is square, finite and symmetric.
    pub fn new(m: Matrix) -> Result<Self> {
        if !m.is_square() {
            return Err(LinalgError::NotSquare {
                rows: m.rows(),
                cols: m.cols(),
            });
        }
        let n = m.rows();
        let scale = m.max_abs().max(1.0);
        let mut sym = m.clone();
        for i in 0..n {
            for j in 0..n {
                let value = m[(i, j)];
                if !value.is_finite() {
                    return Err(LinalgError::NonFinite { row: i, col: j, value });
                }
                if j > i {
                    let delta = (value - m[(j, i)]).abs();
                    if delta > Self::SYMMETRY_TOLERANCE * scale {
                        return Err(LinalgError::NotSymmetric { row: i, col: j, delta });
                    }
                    let avg = 0.5 * (value + m[(j, i)]);
                    sym[(i, j)] = avg;
                    sym[(j, i)] = avg;
                }
            }
        }
        Ok(Self(sym))
    }

    /// Dimension of the matrix.
    pub fn dim(&self) -> usize {
        self.0.rows()
    }

    /// Borrows the underlying matrix.
    pub fn as_matrix(&self) -> &Matrix {
        &self.0
    }
}

/// Dot product of two equal-length slices.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
pub fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}
