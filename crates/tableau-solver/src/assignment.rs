//! Assignment problem solved with the Hungarian (Kuhn-Munkres) algorithm.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssignmentError {
    #[error("Assignment matrix is empty")]
    Empty,
    #[error("Row {row} has {found} entries, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },
    #[error("Non-finite value at row {row}, column {column}")]
    NonFinite { row: usize, column: usize },
    #[error("Matrix has {expected} {axis} but {found} labels were given")]
    Labels {
        axis: &'static str,
        expected: usize,
        found: usize,
    },
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentProblem {
    /// Row labels (agents)
    pub rows: Vec<String>,
    /// Column labels (tasks)
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
    /// Treat the matrix as profits instead of costs
    #[cfg_attr(feature = "serde", serde(default))]
    pub maximize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// `(row, column)` pairs, ordered by row
    pub pairs: Vec<(usize, usize)>,
    /// Sum of the matrix entries over the chosen pairs
    pub total: f64,
}

impl AssignmentProblem {
    /// Rows are labeled `R1..`, columns `C1..`
    pub fn new(matrix: Vec<Vec<f64>>, maximize: bool) -> Self {
        let n_cols = matrix.first().map_or(0, Vec::len);
        Self {
            rows: (1..=matrix.len()).map(|i| format!("R{}", i)).collect(),
            columns: (1..=n_cols).map(|j| format!("C{}", j)).collect(),
            matrix,
            maximize,
        }
    }

    pub fn validate(&self) -> Result<(), AssignmentError> {
        let expected = self.matrix.first().map_or(0, Vec::len);
        if self.matrix.is_empty() || expected == 0 {
            return Err(AssignmentError::Empty);
        }
        for (row, values) in self.matrix.iter().enumerate() {
            if values.len() != expected {
                return Err(AssignmentError::Ragged {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            if let Some(column) = values.iter().position(|v| !v.is_finite()) {
                return Err(AssignmentError::NonFinite { row, column });
            }
        }
        if self.rows.len() != self.matrix.len() {
            return Err(AssignmentError::Labels {
                axis: "rows",
                expected: self.matrix.len(),
                found: self.rows.len(),
            });
        }
        if self.columns.len() != expected {
            return Err(AssignmentError::Labels {
                axis: "columns",
                expected,
                found: self.columns.len(),
            });
        }
        Ok(())
    }

    /// Optimal assignment. With more rows than columns, only as many rows as
    /// there are columns are assigned.
    pub fn solve(&self) -> Result<Assignment, AssignmentError> {
        self.validate()?;

        let sign = if self.maximize { -1.0 } else { 1.0 };
        let n_rows = self.matrix.len();
        let n_cols = self.matrix[0].len();

        let pairs = if n_rows <= n_cols {
            let cost: Vec<Vec<f64>> = self
                .matrix
                .iter()
                .map(|row| row.iter().map(|v| sign * v).collect())
                .collect();
            hungarian(&cost)
                .into_iter()
                .enumerate()
                .collect::<Vec<_>>()
        } else {
            let cost: Vec<Vec<f64>> = (0..n_cols)
                .map(|j| self.matrix.iter().map(|row| sign * row[j]).collect())
                .collect();
            let mut pairs: Vec<(usize, usize)> = hungarian(&cost)
                .into_iter()
                .enumerate()
                .map(|(j, i)| (i, j))
                .collect();
            pairs.sort_unstable();
            pairs
        };

        let total = pairs.iter().map(|&(i, j)| self.matrix[i][j]).sum();
        Ok(Assignment { pairs, total })
    }
}

/// Minimum-cost assignment of every row to a distinct column, `rows <= columns`.
///
/// Returns the column chosen for each row. Shortest augmenting paths with row
/// and column potentials, O(rows^2 * columns).
fn hungarian(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    let m = cost[0].len();

    // 1-based potentials; index 0 is the virtual source column
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; m + 1];
    let mut owner = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        owner[0] = i;
        let mut j0 = 0;
        let mut min_v = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < min_v[j] {
                    min_v[j] = reduced;
                    way[j] = j0;
                }
                if min_v[j] < delta {
                    delta = min_v[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_v[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path back to the source
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0; n];
    for j in 1..=m {
        if owner[j] != 0 {
            assignment[owner[j] - 1] = j - 1;
        }
    }
    assignment
}
