use crate::problem::{ConstraintOp, LpProblem};

/// What a tableau column stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Original decision variable `j`
    Decision(usize),
    /// Slack of the `<=` row at this index
    Slack(usize),
    /// Surplus of the `>=` row at this index
    Surplus(usize),
    /// Artificial variable of the `>=` or `=` row at this index
    Artificial(usize),
}

impl ColumnKind {
    pub fn is_artificial(self) -> bool {
        matches!(self, ColumnKind::Artificial(_))
    }
}

/// A constraint row with a non-negative right-hand side
#[derive(Debug, Clone, PartialEq)]
pub struct StandardRow {
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    pub rhs: f64,
    /// True when the original row was multiplied by -1
    pub flipped: bool,
}

/// The problem rewritten as a minimization over equality rows.
///
/// Columns are laid out as decision variables, then one slack or surplus
/// column per inequality (in row order), then one artificial column per
/// `>=`/`=` row (in row order). The RHS column is implicit.
#[derive(Debug, Clone)]
pub struct StandardForm {
    pub rows: Vec<StandardRow>,
    pub columns: Vec<ColumnKind>,
    pub names: Vec<String>,
    /// Objective coefficients in minimization sense, one per decision variable
    pub costs: Vec<f64>,
    /// Column that is basic in each row before the first pivot
    pub initial_basis: Vec<usize>,
    pub n_vars: usize,
    pub n_slack: usize,
    pub n_artificial: usize,
}

impl StandardForm {
    /// Build the standard form. The problem must already be validated.
    pub fn from_problem(problem: &LpProblem) -> Self {
        let n_vars = problem.num_variables();
        let sign = if problem.objective.minimize { 1.0 } else { -1.0 };
        let costs = problem.objective.coefficients.iter().map(|c| sign * c).collect();

        let rows: Vec<StandardRow> = problem
            .constraints
            .iter()
            .map(|c| {
                if c.rhs < 0.0 {
                    StandardRow {
                        coefficients: c.coefficients.iter().map(|v| -v).collect(),
                        op: c.op.flipped(),
                        rhs: -c.rhs,
                        flipped: true,
                    }
                } else {
                    StandardRow {
                        coefficients: c.coefficients.clone(),
                        op: c.op,
                        rhs: c.rhs,
                        flipped: false,
                    }
                }
            })
            .collect();

        let mut columns: Vec<ColumnKind> = (0..n_vars).map(ColumnKind::Decision).collect();
        let mut names = problem.variables.clone();

        for (i, row) in rows.iter().enumerate() {
            match row.op {
                ConstraintOp::Le => columns.push(ColumnKind::Slack(i)),
                ConstraintOp::Ge => columns.push(ColumnKind::Surplus(i)),
                ConstraintOp::Eq => continue,
            }
            names.push(format!("s{}", columns.len() - n_vars));
        }
        let n_slack = columns.len() - n_vars;

        for (i, row) in rows.iter().enumerate() {
            if row.op != ConstraintOp::Le {
                columns.push(ColumnKind::Artificial(i));
                names.push(format!("a{}", columns.len() - n_vars - n_slack));
            }
        }
        let n_artificial = columns.len() - n_vars - n_slack;

        let mut initial_basis = vec![0; rows.len()];
        for (col, kind) in columns.iter().enumerate() {
            match *kind {
                ColumnKind::Slack(i) | ColumnKind::Artificial(i) => initial_basis[i] = col,
                ColumnKind::Decision(_) | ColumnKind::Surplus(_) => {}
            }
        }

        Self {
            rows,
            columns,
            names,
            costs,
            initial_basis,
            n_vars,
            n_slack,
            n_artificial,
        }
    }

    /// Number of variable columns, excluding the RHS
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn has_artificial(&self) -> bool {
        self.n_artificial > 0
    }

    /// Largest absolute cost, at least 1
    pub fn cost_scale(&self) -> f64 {
        self.costs.iter().fold(1.0_f64, |acc, c| acc.max(c.abs()))
    }

    /// Largest absolute right-hand side, at least 1
    pub fn rhs_scale(&self) -> f64 {
        self.rows.iter().fold(1.0_f64, |acc, r| acc.max(r.rhs.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_layout() {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![4.0, 3.0], true);
        problem.add_constraint("le", vec![1.0, 1.0], ConstraintOp::Le, 10.0);
        problem.add_constraint("ge", vec![1.0, 2.0], ConstraintOp::Ge, 4.0);
        problem.add_constraint("eq", vec![1.0, -1.0], ConstraintOp::Eq, 1.0);

        let form = StandardForm::from_problem(&problem);

        assert_eq!(form.n_slack, 2);
        assert_eq!(form.n_artificial, 2);
        assert_eq!(form.num_columns(), 2 + 2 + 2);
        assert_eq!(
            form.columns,
            vec![
                ColumnKind::Decision(0),
                ColumnKind::Decision(1),
                ColumnKind::Slack(0),
                ColumnKind::Surplus(1),
                ColumnKind::Artificial(1),
                ColumnKind::Artificial(2),
            ]
        );
        assert_eq!(form.names, vec!["x", "y", "s1", "s2", "a1", "a2"]);
        assert_eq!(form.initial_basis, vec![2, 4, 5]);
    }

    #[test]
    fn test_negative_rhs_is_flipped() {
        let mut problem = LpProblem::with_dimension(2);
        problem.set_objective(vec![1.0, 2.0], false);
        problem.add_constraint("neg", vec![-1.0, -1.0], ConstraintOp::Le, -3.0);

        let form = StandardForm::from_problem(&problem);
        let row = &form.rows[0];

        assert!(row.flipped);
        assert_eq!(row.op, ConstraintOp::Ge);
        assert_eq!(row.rhs, 3.0);
        assert_eq!(row.coefficients, vec![1.0, 1.0]);
        // Maximization is stored as minimization of the negated costs
        assert_eq!(form.costs, vec![-1.0, -2.0]);
        assert!(form.has_artificial());
    }
}
