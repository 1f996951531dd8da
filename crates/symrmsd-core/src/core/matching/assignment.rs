use nalgebra::DMatrix;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("cost matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("cost matrix contains a non-finite entry at ({row}, {col})")]
    NonFinite { row: usize, col: usize },

    #[error("solver returned {len} column(s) that are not a permutation of 0..{expected}")]
    InvalidPermutation { len: usize, expected: usize },
}

/// Minimum-cost perfect bipartite matching capability.
pub trait AssignmentSolver: Send + Sync {
    /// Solves the linear assignment problem on a square cost matrix.
    ///
    /// Returns `assignment` with `assignment[row] == col`.
    fn solve(&self, cost: &DMatrix<f64>) -> Result<Vec<usize>, AssignmentError>;
}

/// Hungarian method with row potentials and shortest augmenting paths, O(n^3).
#[derive(Debug, Clone, Copy, Default)]
pub struct Hungarian;

impl AssignmentSolver for Hungarian {
    fn solve(&self, cost: &DMatrix<f64>) -> Result<Vec<usize>, AssignmentError> {
        let (rows, cols) = cost.shape();
        if rows != cols {
            return Err(AssignmentError::NotSquare { rows, cols });
        }
        if let Some((idx, _)) = cost.iter().enumerate().find(|(_, c)| !c.is_finite()) {
            // DMatrix storage is column-major.
            return Err(AssignmentError::NonFinite {
                row: idx % rows,
                col: idx / rows,
            });
        }
        let n = rows;
        if n == 0 {
            return Ok(Vec::new());
        }

        // 1-based: index 0 of `row_of_col` is the virtual column used to start each search.
        let mut row_potential = vec![0.0; n + 1];
        let mut col_potential = vec![0.0; n + 1];
        let mut row_of_col = vec![0usize; n + 1];
        let mut prev_col = vec![0usize; n + 1];

        for row in 1..=n {
            row_of_col[0] = row;
            let mut col0 = 0;
            let mut min_slack = vec![f64::INFINITY; n + 1];
            let mut used = vec![false; n + 1];

            loop {
                used[col0] = true;
                let row0 = row_of_col[col0];
                let mut delta = f64::INFINITY;
                let mut col1 = 0;
                for col in 1..=n {
                    if used[col] {
                        continue;
                    }
                    let slack =
                        cost[(row0 - 1, col - 1)] - row_potential[row0] - col_potential[col];
                    if slack < min_slack[col] {
                        min_slack[col] = slack;
                        prev_col[col] = col0;
                    }
                    if min_slack[col] < delta {
                        delta = min_slack[col];
                        col1 = col;
                    }
                }
                for col in 0..=n {
                    if used[col] {
                        row_potential[row_of_col[col]] += delta;
                        col_potential[col] -= delta;
                    } else {
                        min_slack[col] -= delta;
                    }
                }
                col0 = col1;
                if row_of_col[col0] == 0 {
                    break;
                }
            }

            loop {
                let col1 = prev_col[col0];
                row_of_col[col0] = row_of_col[col1];
                col0 = col1;
                if col0 == 0 {
                    break;
                }
            }
        }

        let mut assignment = vec![0; n];
        for col in 1..=n {
            assignment[row_of_col[col] - 1] = col - 1;
        }
        Ok(assignment)
    }
}
