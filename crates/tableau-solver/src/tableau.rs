use crate::standard_form::{ColumnKind, StandardForm};

/// Dense simplex tableau.
///
/// The reduced costs are kept in two rows below the constraints: the cost row
/// and the penalty row holding the coefficients of `M`. A column's reduced cost
/// is `cost + M * penalty`, and the RHS cells hold the negated objective of the
/// internal minimization in the same split form. The last column holds the
/// right-hand sides. The shape is fixed at construction.
#[derive(Debug, Clone)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    basis: Vec<usize>,
    columns: Vec<ColumnKind>,
    names: Vec<String>,
    n_vars: usize,
    big_m: f64,
}

/// Outcome of the minimum-ratio test on an entering column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatioTest {
    /// Row whose basic variable leaves
    Leaving(usize),
    /// No row limits the entering variable
    Unbounded,
    /// Only rows with a pivot element too small to trust
    Unreliable,
}

impl Tableau {
    /// Build the initial tableau, pricing artificial columns at `big_m` and
    /// eliminating them from the objective row so every basic column has a
    /// zero reduced cost.
    pub fn big_m(form: &StandardForm, big_m: f64) -> Self {
        let n_rows = form.rows.len();
        let n_cols = form.num_columns();
        let rhs_col = n_cols;

        let (cost, penalty) = (n_rows, n_rows + 1);
        let mut data = vec![vec![0.0; n_cols + 1]; n_rows + 2];

        for (i, row) in form.rows.iter().enumerate() {
            data[i][..form.n_vars].copy_from_slice(&row.coefficients);
            data[i][rhs_col] = row.rhs;
        }

        for (col, kind) in form.columns.iter().enumerate() {
            match *kind {
                ColumnKind::Decision(j) => data[cost][col] = form.costs[j],
                ColumnKind::Slack(i) => data[i][col] = 1.0,
                ColumnKind::Surplus(i) => data[i][col] = -1.0,
                ColumnKind::Artificial(i) => {
                    data[i][col] = 1.0;
                    data[penalty][col] = 1.0;
                }
            }
        }

        let (rows, objective) = data.split_at_mut(n_rows);
        let penalty = &mut objective[1];
        for (row, &basic) in rows.iter().zip(&form.initial_basis) {
            if form.columns[basic].is_artificial() {
                for (p, value) in penalty.iter_mut().zip(row) {
                    *p -= value;
                }
            }
        }

        Self {
            data,
            basis: form.initial_basis.clone(),
            columns: form.columns.clone(),
            names: form.names.clone(),
            n_vars: form.n_vars,
            big_m,
        }
    }

    /// Number of constraint rows
    pub fn num_rows(&self) -> usize {
        self.basis.len()
    }

    /// Number of variable columns, excluding the RHS
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    /// Constraint row including its RHS cell
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row]
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.data[row][self.num_columns()]
    }

    pub fn big_m_value(&self) -> f64 {
        self.big_m
    }

    fn cost_row(&self) -> &[f64] {
        &self.data[self.num_rows()]
    }

    /// Coefficients of `M` in the reduced costs, excluding the RHS cell
    pub fn penalty_row(&self) -> &[f64] {
        &self.data[self.num_rows() + 1][..self.num_columns()]
    }

    /// `cost + M * penalty` for column `col`
    pub fn reduced_cost(&self, col: usize) -> f64 {
        self.cost_row()[col] + self.big_m * self.penalty_row()[col]
    }

    /// Reduced costs of every column, excluding the RHS cell
    pub fn objective_row(&self) -> Vec<f64> {
        (0..self.num_columns()).map(|col| self.reduced_cost(col)).collect()
    }

    /// RHS cell of the objective row, the negated internal objective
    pub fn objective_rhs(&self) -> f64 {
        let rhs_col = self.num_columns();
        self.cost_row()[rhs_col] + self.big_m * self.data[self.num_rows() + 1][rhs_col]
    }

    /// Current value of the internal (minimization, Big-M penalized) objective
    pub fn objective_value(&self) -> f64 {
        -self.objective_rhs()
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn column_kind(&self, col: usize) -> ColumnKind {
        self.columns[col]
    }

    pub fn column_name(&self, col: usize) -> &str {
        &self.names[col]
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Name of the variable basic in `row`
    pub fn basic_name(&self, row: usize) -> &str {
        &self.names[self.basis[row]]
    }

    /// Most negative reduced cost below `-cost_tolerance`, lowest index on ties.
    ///
    /// Penalty coefficients within `zero_tolerance` of zero count as zero, so
    /// rounding noise in the penalty row is never amplified by `M`.
    pub fn entering_column(&self, zero_tolerance: f64, cost_tolerance: f64) -> Option<usize> {
        let mut best = -cost_tolerance;
        let mut entering = None;
        for (j, (&cost, &penalty)) in self.cost_row().iter().zip(self.penalty_row()).enumerate() {
            let value = if penalty.abs() <= zero_tolerance {
                cost
            } else {
                cost + self.big_m * penalty
            };
            if value < best {
                best = value;
                entering = Some(j);
            }
        }
        entering
    }

    /// No column can lower the total artificial value any further
    pub fn penalty_settled(&self, zero_tolerance: f64) -> bool {
        self.penalty_row().iter().all(|&p| p >= -zero_tolerance)
    }

    /// Minimum-ratio test over rows with an entry above `pivot_tolerance`.
    /// Entries in `(zero_tolerance, pivot_tolerance]` are skipped as unreliable.
    pub fn ratio_test(&self, col: usize, zero_tolerance: f64, pivot_tolerance: f64) -> RatioTest {
        let mut min_ratio = f64::INFINITY;
        let mut leaving = None;
        let mut saw_unreliable = false;

        for i in 0..self.num_rows() {
            let value = self.data[i][col];
            if value > pivot_tolerance {
                let ratio = self.rhs(i) / value;
                if ratio < min_ratio - zero_tolerance {
                    min_ratio = ratio;
                    leaving = Some(i);
                }
            } else if value > zero_tolerance {
                saw_unreliable = true;
            }
        }

        match leaving {
            Some(row) => RatioTest::Leaving(row),
            None if saw_unreliable => RatioTest::Unreliable,
            None => RatioTest::Unbounded,
        }
    }

    /// Exchange the basic variable of `row` for column `col`.
    ///
    /// The pivot row is normalized before it is used to eliminate `col` from
    /// every other row, the cost and penalty rows included.
    pub fn pivot(&mut self, row: usize, col: usize) {
        let mut pivot_row = std::mem::take(&mut self.data[row]);
        let pivot = pivot_row[col];
        for value in pivot_row.iter_mut() {
            *value /= pivot;
        }

        for other in self.data.iter_mut() {
            if other.is_empty() {
                continue;
            }
            let factor = other[col];
            if factor == 0.0 {
                continue;
            }
            for (value, p) in other.iter_mut().zip(&pivot_row) {
                *value -= factor * p;
            }
        }

        self.data[row] = pivot_row;
        self.basis[row] = col;
    }

    /// Values of the decision variables in the current basic solution
    pub fn decision_values(&self) -> Vec<f64> {
        let mut values = vec![0.0; self.n_vars];
        for (row, &col) in self.basis.iter().enumerate() {
            if let ColumnKind::Decision(j) = self.columns[col] {
                values[j] = self.rhs(row);
            }
        }
        values
    }

    /// Largest value of an artificial variable still in the basis
    pub fn max_basic_artificial(&self) -> f64 {
        self.basis
            .iter()
            .enumerate()
            .filter(|&(_, &col)| self.columns[col].is_artificial())
            .map(|(row, _)| self.rhs(row))
            .fold(0.0, f64::max)
    }
}
