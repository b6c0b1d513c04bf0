//! The reporter × decision vote matrix.

use consensus_linalg::Matrix;
use serde::{Deserialize, Serialize};

use crate::error::RoundError;
use crate::Result;

/// Votes from every reporter (rows) on every decision (columns).
///
/// A cell is `None` when the reporter did not vote. The matrix is never
/// mutated after construction; rescaling and imputation build new values.
///
/// Serialises as nested rows with `null` for missing votes.
///
/// # Example
///
/// ```rust
/// use consensus_engine::VoteMatrix;
///
/// let votes = VoteMatrix::new(vec![
///     vec![Some(1.0), None],
///     vec![Some(0.0), Some(1.0)],
/// ])?;
/// assert_eq!(votes.reporters(), 2);
/// assert_eq!(votes.missing_count(), 1);
/// # Ok::<(), consensus_engine::RoundError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Option<f64>>>", into = "Vec<Vec<Option<f64>>>")]
pub struct VoteMatrix {
    rows: Vec<Vec<Option<f64>>>,
    decisions: usize,
}

impl VoteMatrix {
    /// Builds a vote matrix, checking shape and finiteness.
    ///
    /// # Errors
    ///
    /// - [`RoundError::NoReporters`] / [`RoundError::NoDecisions`] for empty input
    /// - [`RoundError::RaggedRow`] when rows differ in length
    /// - [`RoundError::NonFiniteVote`] for NaN or infinite votes
    pub fn new(rows: Vec<Vec<Option<f64>>>) -> Result<Self> {
        let first = rows.first().ok_or(RoundError::NoReporters)?;
        let decisions = first.len();
        if decisions == 0 {
            return Err(RoundError::NoDecisions);
        }

        for (reporter, row) in rows.iter().enumerate() {
            if row.len() != decisions {
                return Err(RoundError::RaggedRow {
                    reporter,
                    expected: decisions,
                    actual: row.len(),
                });
            }
            for (decision, cell) in row.iter().enumerate() {
                if cell.is_some_and(|v| !v.is_finite()) {
                    return Err(RoundError::NonFiniteVote { reporter, decision });
                }
            }
        }

        Ok(Self { rows, decisions })
    }

    /// Number of reporters (rows).
    pub fn reporters(&self) -> usize {
        self.rows.len()
    }

    /// Number of decisions (columns).
    pub fn decisions(&self) -> usize {
        self.decisions
    }

    /// The vote of `reporter` on `decision`, if any.
    pub fn get(&self, reporter: usize, decision: usize) -> Option<f64> {
        self.rows[reporter][decision]
    }

    /// Borrows all rows.
    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    /// The `(reporter, vote)` pairs present in column `decision`.
    pub fn column_votes(&self, decision: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(move |(i, row)| row[decision].map(|v| (i, v)))
    }

    /// Total number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_none()).count()
    }

    /// Number of missing cells in one reporter's row, or `None` if there is
    /// no such reporter.
    pub fn missing_in_row(&self, reporter: usize) -> Option<usize> {
        let row = self.rows.get(reporter)?;
        Some(row.iter().filter(|c| c.is_none()).count())
    }

    /// `true` where a vote is missing.
    pub fn missing_mask(&self) -> Vec<Vec<bool>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(Option::is_none).collect())
            .collect()
    }

    /// Applies `f(decision, vote)` to every present vote.
    pub fn map_present(&self, mut f: impl FnMut(usize, f64) -> f64) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(j, cell)| cell.map(|v| f(j, v)))
                    .collect()
            })
            .collect();
        Self {
            rows,
            decisions: self.decisions,
        }
    }
}

impl From<&Matrix> for VoteMatrix {
    fn from(m: &Matrix) -> Self {
        Self {
            rows: m
                .iter_rows()
                .map(|row| row.iter().copied().map(Some).collect())
                .collect(),
            decisions: m.cols(),
        }
    }
}

impl TryFrom<Vec<Vec<Option<f64>>>> for VoteMatrix {
    type Error = RoundError;

    fn try_from(rows: Vec<Vec<Option<f64>>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<VoteMatrix> for Vec<Vec<Option<f64>>> {
    fn from(m: VoteMatrix) -> Self {
        m.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert_eq!(VoteMatrix::new(vec![]), Err(RoundError::NoReporters));
        assert_eq!(VoteMatrix::new(vec![vec![]]), Err(RoundError::NoDecisions));
    }

    #[test]
    fn test_rejects_ragged() {
        let err = VoteMatrix::new(vec![vec![Some(1.0), None], vec![Some(1.0)]]).unwrap_err();
        assert_eq!(
            err,
            RoundError::RaggedRow {
                reporter: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_rejects_nan() {
        let err = VoteMatrix::new(vec![vec![Some(1.0), Some(f64::NAN)]]).unwrap_err();
        assert_eq!(
            err,
            RoundError::NonFiniteVote {
                reporter: 0,
                decision: 1
            }
        );
    }

    #[test]
    fn test_missing_accounting() {
        let m = VoteMatrix::new(vec![
            vec![Some(1.0), None, None],
            vec![Some(0.0), Some(1.0), None],
        ])
        .unwrap();
        assert_eq!(m.missing_count(), 3);
        assert_eq!(m.missing_in_row(0), Some(2));
        assert_eq!(m.missing_in_row(1), Some(1));
        assert_eq!(m.missing_in_row(2), None);
        assert_eq!(
            m.missing_mask(),
            vec![vec![false, true, true], vec![false, false, true]]
        );
        assert_eq!(m.column_votes(1).collect::<Vec<_>>(), vec![(1, 1.0)]);
    }

    #[test]
    fn test_from_dense_has_no_missing() {
        let dense = Matrix::from_rows(vec![vec![1.0, 0.5], vec![0.0, 1.0]]).unwrap();
        let votes = VoteMatrix::from(&dense);
        assert_eq!(votes.missing_count(), 0);
        assert_eq!(votes.column_votes(0).collect::<Vec<_>>(), vec![(0, 1.0), (1, 0.0)]);
    }

    #[test]
    fn test_serde_uses_null_for_missing() {
        let m = VoteMatrix::new(vec![vec![Some(1.0), None]]).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "[[1.0,null]]");
        let back: VoteMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_serde_validates() {
        let parsed: std::result::Result<VoteMatrix, _> = serde_json::from_str("[[1.0],[1.0,0.0]]");
        assert!(parsed.is_err());
    }
}
