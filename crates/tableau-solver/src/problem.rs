use thiserror::Error;

/// Errors raised while validating a problem, before any tableau is built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Problem has no decision variables")]
    NoVariables,
    #[error("Objective has {found} coefficients but the problem has {expected} variables")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("Constraint {constraint} has {found} coefficients but the problem has {expected} variables")]
    ConstraintLength {
        constraint: String,
        expected: usize,
        found: usize,
    },
    #[error("Non-finite value in {location}")]
    NonFinite { location: String },
    #[error("Graphical method needs exactly 2 variables, got {0}")]
    NotTwoDimensional(usize),
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
}

/// Represents a linear programming problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients (costs)
    pub objective: Objective,
    /// Constraints
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    #[cfg_attr(feature = "serde", serde(default = "default_minimize"))]
    pub minimize: bool,
}

#[cfg(feature = "serde")]
fn default_minimize() -> bool {
    true
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    /// The operator obtained by multiplying both sides by -1
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }
}

impl std::fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Constraint {
    /// Left-hand side value of the constraint at `values`
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// Whether `values` satisfies this constraint within `tolerance`
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs(values);
        match self.op {
            ConstraintOp::Le => lhs <= self.rhs + tolerance,
            ConstraintOp::Ge => lhs >= self.rhs - tolerance,
            ConstraintOp::Eq => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
        }
    }

    /// Shorthand for a problem whose variables are named `x1..xn`
    pub fn with_dimension(n: usize) -> Self {
        Self::new((1..=n).map(|i| format!("x{}", i)).collect())
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value at `values` in the problem's own sense
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// Whether `values` is non-negative and satisfies every constraint within `tolerance`
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.num_variables()
            && values.iter().all(|&v| v >= -tolerance)
            && self.constraints.iter().all(|c| c.is_satisfied_by(values, tolerance))
    }

    /// Check dimensions and finiteness. Called by the solver before building a tableau.
    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.num_variables();
        if n == 0 {
            return Err(ProblemError::NoVariables);
        }
        if self.objective.coefficients.len() != n {
            return Err(ProblemError::ObjectiveLength {
                expected: n,
                found: self.objective.coefficients.len(),
            });
        }
        if let Some(j) = self.objective.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(ProblemError::NonFinite {
                location: format!("objective coefficient {}", self.variables[j]),
            });
        }

        for c in &self.constraints {
            if c.coefficients.len() != n {
                return Err(ProblemError::ConstraintLength {
                    constraint: c.name.clone(),
                    expected: n,
                    found: c.coefficients.len(),
                });
            }
            if c.coefficients.iter().any(|v| !v.is_finite()) {
                return Err(ProblemError::NonFinite {
                    location: format!("coefficients of {}", c.name),
                });
            }
            if !c.rhs.is_finite() {
                return Err(ProblemError::NonFinite {
                    location: format!("right-hand side of {}", c.name),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_lengths() {
        let mut problem = LpProblem::with_dimension(2);
        problem.set_objective(vec![1.0], true);
        assert_eq!(
            problem.validate(),
            Err(ProblemError::ObjectiveLength { expected: 2, found: 1 })
        );

        problem.set_objective(vec![1.0, 2.0], true);
        problem.add_constraint("short", vec![1.0], ConstraintOp::Le, 4.0);
        assert!(matches!(
            problem.validate(),
            Err(ProblemError::ConstraintLength { ref constraint, expected: 2, found: 1 }) if constraint == "short"
        ));
    }

    #[test]
    fn test_validate_non_finite() {
        let mut problem = LpProblem::with_dimension(1);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("bad", vec![1.0], ConstraintOp::Ge, f64::NAN);
        assert!(matches!(problem.validate(), Err(ProblemError::NonFinite { .. })));

        assert_eq!(LpProblem::new(Vec::new()).validate(), Err(ProblemError::NoVariables));
    }

    #[test]
    fn test_satisfaction() {
        let mut problem = LpProblem::with_dimension(2);
        problem.set_objective(vec![1.0, 1.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("diff", vec![1.0, -1.0], ConstraintOp::Eq, 0.0);

        assert!(problem.is_satisfied_by(&[2.0, 2.0], 1e-9));
        assert!(!problem.is_satisfied_by(&[3.0, 2.0], 1e-9));
        assert!(!problem.is_satisfied_by(&[-1.0, -1.0], 1e-9));
        assert_eq!(problem.evaluate(&[2.0, 2.0]), 4.0);
        assert_eq!(ConstraintOp::Ge.flipped(), ConstraintOp::Le);
    }
}
