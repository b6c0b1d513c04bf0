//! Dominant eigenpairs of small dense symmetric matrices.
//!
//! Only the first principal factor is ever needed, so the public surface is
//! a single operation, [`EigenSolver::dominant_eigenvector`]. Two backends
//! implement it:
//!
//! - [`JacobiSolver`]: cyclic Jacobi rotations. Computes the full spectrum,
//!   so clustered or repeated eigenvalues are handled without special cases.
//! - [`PowerIteration`]: repeated multiplication from a deterministic start
//!   vector. Cheaper per step; results it cannot certify as dominant, and
//!   near-ties it cannot separate, are handed to [`JacobiSolver`].
//!
//! Both return vectors with a canonical sign: the component of largest
//! magnitude is positive, and among equal magnitudes the lowest index wins.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LinalgError, Result};
use crate::matrix::{dot, norm, Matrix, SymmetricMatrix};

/// An eigenvalue with its unit-length eigenvector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EigenPair {
    /// The eigenvalue.
    pub value: f64,
    /// Unit-length eigenvector.
    pub vector: Vec<f64>,
}

/// A backend able to find the eigenpair with the largest eigenvalue.
pub trait EigenSolver: std::fmt::Debug + Send + Sync {
    /// Returns the eigenpair with the largest eigenvalue.
    ///
    /// An all-zero matrix yields eigenvalue 0 and the first unit vector.
    fn dominant_eigenvector(&self, matrix: &SymmetricMatrix) -> Result<EigenPair>;
}

/// Selects an eigensolver implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EigenBackend {
    /// Cyclic Jacobi rotations (default).
    #[default]
    Jacobi,
    /// Power iteration.
    Power,
}

impl EigenBackend {
    /// Builds the solver for this backend.
    ///
    /// `max_iterations` is the sweep cap for Jacobi and the iteration cap
    /// for power iteration.
    pub fn solver(self, tolerance: f64, max_iterations: usize) -> Box<dyn EigenSolver> {
        match self {
            Self::Jacobi => Box::new(JacobiSolver::new(tolerance, max_iterations)),
            Self::Power => Box::new(PowerIteration::new(tolerance, max_iterations)),
        }
    }
}

/// Cyclic Jacobi eigenvalue solver.
///
/// Each sweep applies one plane rotation per off-diagonal pair, driving the
/// off-diagonal mass to zero. Converges quadratically; a handful of sweeps
/// is typical for matrices of a few dozen rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobiSolver {
    /// Relative off-diagonal norm at which iteration stops.
    pub tolerance: f64,
    /// Maximum number of sweeps.
    pub max_sweeps: usize,
}

impl Default for JacobiSolver {
    fn default() -> Self {
        Self::new(1e-12, 100)
    }
}

impl JacobiSolver {
    /// Creates a solver with the given tolerance and sweep cap.
    pub const fn new(tolerance: f64, max_sweeps: usize) -> Self {
        Self {
            tolerance,
            max_sweeps,
        }
    }

    /// Computes every eigenpair, in index order of the diagonalised matrix.
    pub fn decompose(&self, matrix: &SymmetricMatrix) -> Result<Vec<EigenPair>> {
        let n = matrix.dim();
        let mut a = matrix.as_matrix().clone();
        let mut v = Matrix::identity(n);

        let total = frobenius_sq(&a);
        if total == 0.0 {
            return Ok(collect_pairs(&a, &v));
        }
        let threshold = self.tolerance * self.tolerance * total;

        let mut off = off_diagonal_sq(&a);
        let mut sweeps = 0;
        while off > threshold {
            if sweeps == self.max_sweeps {
                return Err(LinalgError::NoConvergence {
                    solver: "jacobi",
                    iterations: sweeps,
                    residual: (off / total).sqrt(),
                });
            }
            for p in 0..n {
                for q in (p + 1)..n {
                    rotate(&mut a, &mut v, p, q);
                }
            }
            sweeps += 1;
            off = off_diagonal_sq(&a);
        }

        debug!(sweeps, dim = n, "jacobi converged");
        Ok(collect_pairs(&a, &v))
    }
}

impl EigenSolver for JacobiSolver {
    fn dominant_eigenvector(&self, matrix: &SymmetricMatrix) -> Result<EigenPair> {
        let pairs = self.decompose(matrix)?;
        let mut best = 0;
        for (k, pair) in pairs.iter().enumerate() {
            if pair.value > pairs[best].value {
                best = k;
            }
        }
        let mut pair = pairs.into_iter().nth(best).ok_or(LinalgError::Empty {
            rows: matrix.dim(),
            cols: matrix.dim(),
        })?;
        canonicalize_sign(&mut pair.vector);
        Ok(pair)
    }
}

/// Power-iteration solver.
///
/// Starts from the column of the matrix with the largest norm and stops
/// once the eigen-residual `‖A·v − λ·v‖` falls below `tolerance · ‖A‖∞`.
///
/// Power iteration alone cannot tell whether it converged to the dominant
/// eigenpair: a start vector orthogonal to the dominant direction (common
/// for block-structured covariances) settles in another invariant subspace.
/// A converged pair `(λ, v)` is therefore only accepted when the deflated
/// matrix `A − λ·v·vᵀ` has infinity norm at most `λ`, which bounds every
/// remaining eigenvalue by `λ`. When that bound fails, or the iteration cap
/// is hit (top eigenvalues too close to separate), the solver falls back to
/// [`JacobiSolver`] with the same tolerance and cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerIteration {
    /// Eigen-residual, relative to `‖A‖∞`, at which iteration stops.
    pub tolerance: f64,
    /// Maximum number of multiplications.
    pub max_iterations: usize,
}

impl Default for PowerIteration {
    fn default() -> Self {
        Self::new(1e-12, 10_000)
    }
}

impl PowerIteration {
    /// Creates a solver with the given tolerance and iteration cap.
    pub const fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Runs plain power iteration from `start`.
    ///
    /// Returns `None` if the residual never drops below the threshold.
    fn iterate(&self, m: &Matrix, start: Vec<f64>, scale: f64) -> Result<Option<EigenPair>> {
        let threshold = self.tolerance * scale;
        let mut v = start;
        for iteration in 0..self.max_iterations {
            let w = m.mul_vec(&v)?;
            let value = dot(&v, &w);
            let residual = norm(&w.iter().zip(&v).map(|(a, b)| a - value * b).collect::<Vec<_>>());
            if residual <= threshold {
                debug!(iterations = iteration + 1, residual, "power iteration converged");
                return Ok(Some(EigenPair { value, vector: v }));
            }
            let w_norm = norm(&w);
            if w_norm == 0.0 {
                return Ok(None);
            }
            v = w.into_iter().map(|x| x / w_norm).collect();
        }
        Ok(None)
    }

    fn fallback(&self, matrix: &SymmetricMatrix, reason: &str) -> Result<EigenPair> {
        debug!(reason, dim = matrix.dim(), "power iteration falling back to jacobi");
        JacobiSolver::new(self.tolerance, self.max_iterations).dominant_eigenvector(matrix)
    }
}

impl EigenSolver for PowerIteration {
    fn dominant_eigenvector(&self, matrix: &SymmetricMatrix) -> Result<EigenPair> {
        let m = matrix.as_matrix();
        let n = matrix.dim();
        if n == 0 {
            return Err(LinalgError::Empty { rows: 0, cols: 0 });
        }

        let mut start = 0;
        let mut start_norm = 0.0;
        for j in 0..n {
            let col_norm = norm(&m.column(j));
            if col_norm > start_norm {
                start = j;
                start_norm = col_norm;
            }
        }
        if start_norm == 0.0 {
            return Ok(EigenPair {
                value: 0.0,
                vector: unit(n, 0),
            });
        }

        let scale = infinity_norm(m);
        let v0 = m.column(start).iter().map(|x| x / start_norm).collect();
        let Some(mut pair) = self.iterate(m, v0, scale)? else {
            return self.fallback(matrix, "no convergence");
        };

        // Every other eigenvalue of A is an eigenvalue of the deflated matrix.
        let deflated = deflated_infinity_norm(m, &pair);
        if deflated > pair.value + self.tolerance * scale {
            debug!(value = pair.value, deflated, "converged pair not shown dominant");
            return self.fallback(matrix, "dominance not certified");
        }

        canonicalize_sign(&mut pair.vector);
        Ok(pair)
    }
}

/// Flips `v` so its largest-magnitude component is positive.
pub fn canonicalize_sign(v: &mut [f64]) {
    let mut pivot = 0;
    for (k, x) in v.iter().enumerate() {
        if x.abs() > v[pivot].abs() {
            pivot = k;
        }
    }
    if v.get(pivot).is_some_and(|x| *x < 0.0) {
        v.iter_mut().for_each(|x| *x = -*x);
    }
}

/// Applies the rotation that zeroes `a[(p, q)]`, accumulating it into `v`.
fn rotate(a: &mut Matrix, v: &mut Matrix, p: usize, q: usize) {
    let apq = a[(p, q)];
    if apq == 0.0 {
        return;
    }
    let theta = (a[(q, q)] - a[(p, p)]) / (2.0 * apq);
    let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
    let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;

    let n = a.rows();
    for k in 0..n {
        let akp = a[(k, p)];
        let akq = a[(k, q)];
        a[(k, p)] = c * akp - s * akq;
        a[(k, q)] = s * akp + c * akq;
    }
    for k in 0..n {
        let apk = a[(p, k)];
        let aqk = a[(q, k)];
        a[(p, k)] = c * apk - s * aqk;
        a[(q, k)] = s * apk + c * aqk;
    }
    for k in 0..n {
        let vkp = v[(k, p)];
        let vkq = v[(k, q)];
        v[(k, p)] = c * vkp - s * vkq;
        v[(k, q)] = s * vkp + c * vkq;
    }
}

fn collect_pairs(a: &Matrix, v: &Matrix) -> Vec<EigenPair> {
    (0..a.rows())
        .map(|k| EigenPair {
            value: a[(k, k)],
            vector: v.column(k),
        })
        .collect()
}

fn frobenius_sq(a: &Matrix) -> f64 {
    a.iter_rows().flatten().map(|x| x * x).sum()
}

fn off_diagonal_sq(a: &Matrix) -> f64 {
    let mut sum = 0.0;
    for i in 0..a.rows() {
        for j in 0..a.cols() {
            if i != j {
                sum += a[(i, j)] * a[(i, j)];
            }
        }
    }
    sum
}

/// Maximum absolute row sum, an upper bound on every eigenvalue magnitude.
fn infinity_norm(a: &Matrix) -> f64 {
    a.iter_rows()
        .map(|row| row.iter().map(|x| x.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// `‖A − λ·v·vᵀ‖∞` without materialising the deflated matrix.
fn deflated_infinity_norm(a: &Matrix, pair: &EigenPair) -> f64 {
    let v = &pair.vector;
    a.iter_rows()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .zip(v)
                .map(|(x, vj)| (x - pair.value * v[i] * vj).abs())
                .sum::<f64>()
        })
        .fold(0.0, f64::max)
}

fn unit(n: usize, k: usize) -> Vec<f64> {
    let mut e = vec![0.0; n];
    e[k] = 1.0;
    e
}
