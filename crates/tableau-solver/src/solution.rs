use crate::problem::{ConstraintOp, LpProblem};

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Value of each decision variable in the final basic solution
    pub values: Vec<f64>,
    /// Objective value in the problem's own sense (maximization reports the maximum)
    pub objective_value: f64,
    /// Number of pivots performed
    pub iterations: usize,
    /// Constraint activity report
    pub analysis: Analysis,
    /// Constraint violations (populated when infeasible)
    pub violations: Vec<ConstraintViolation>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The iteration cap was hit or no trustworthy pivot was left
    DegenerateLimit,
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SolutionStatus::Optimal => "OPTIMAL",
            SolutionStatus::Infeasible => "INFEASIBLE",
            SolutionStatus::Unbounded => "UNBOUNDED",
            SolutionStatus::DegenerateLimit => "DEGENERATE_LIMIT",
        })
    }
}

/// How each original constraint is met by the solution
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Analysis {
    /// One entry per constraint, in problem order
    pub activities: Vec<ConstraintActivity>,
    /// Which constraints are binding (tight) at the solution
    pub binding_constraints: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintActivity {
    /// Constraint name
    pub constraint: String,
    pub op: ConstraintOp,
    /// Left-hand side at the solution
    pub lhs: f64,
    /// Right-hand side of the constraint
    pub rhs: f64,
    /// Distance to the bound: `rhs - lhs` for `<=`, `lhs - rhs` otherwise
    pub slack: f64,
    pub binding: bool,
}

/// Information about a violated constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Constraint name
    pub constraint: String,
    /// Required value (from constraint RHS)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
    /// Human-readable description of what's wrong
    pub description: String,
}

impl Solution {
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Value of the named decision variable
    pub fn value_of(&self, problem: &LpProblem, name: &str) -> Option<f64> {
        let j = problem.variables.iter().position(|v| v == name)?;
        self.values.get(j).copied()
    }
}

impl Analysis {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Substitute `values` into every constraint of `problem`
    pub fn compute(problem: &LpProblem, values: &[f64], tolerance: f64) -> Self {
        let activities: Vec<ConstraintActivity> = problem
            .constraints
            .iter()
            .map(|c| {
                let lhs = c.lhs(values);
                let slack = match c.op {
                    ConstraintOp::Le => c.rhs - lhs,
                    ConstraintOp::Ge | ConstraintOp::Eq => lhs - c.rhs,
                };
                ConstraintActivity {
                    constraint: c.name.clone(),
                    op: c.op,
                    lhs,
                    rhs: c.rhs,
                    slack,
                    binding: slack.abs() <= tolerance * c.rhs.abs().max(1.0),
                }
            })
            .collect();

        let binding_constraints = activities
            .iter()
            .filter(|a| a.binding)
            .map(|a| a.constraint.clone())
            .collect();

        Self {
            activities,
            binding_constraints,
        }
    }
}

/// Find which constraints are violated by a given point, worst first
pub fn find_violations(problem: &LpProblem, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    for c in &problem.constraints {
        let lhs = c.lhs(values);
        let tol = tolerance * c.rhs.abs().max(1.0);

        let violation = match c.op {
            ConstraintOp::Le if lhs > c.rhs + tol => {
                let amt = lhs - c.rhs;
                Some((amt, format!("{} exceeds maximum of {:.2} by {:.2}", c.name, c.rhs, amt)))
            }
            ConstraintOp::Ge if lhs < c.rhs - tol => {
                let amt = c.rhs - lhs;
                Some((amt, format!("{} is below minimum of {:.2} by {:.2}", c.name, c.rhs, amt)))
            }
            ConstraintOp::Eq if (lhs - c.rhs).abs() > tol => Some((
                (lhs - c.rhs).abs(),
                format!("{} requires exactly {:.2} but got {:.2}", c.name, c.rhs, lhs),
            )),
            _ => None,
        };

        if let Some((violation_amount, description)) = violation {
            violations.push(ConstraintViolation {
                constraint: c.name.clone(),
                required: c.rhs,
                actual: lhs,
                violation_amount,
                description,
            });
        }
    }

    violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diet() -> LpProblem {
        let mut problem = LpProblem::with_dimension(2);
        problem.set_objective(vec![1.0, 1.0], true);
        problem.add_constraint("protein", vec![3.0, 4.0], ConstraintOp::Ge, 12.0);
        problem.add_constraint("fat", vec![1.0, 1.0], ConstraintOp::Le, 10.0);
        problem.add_constraint("exact", vec![1.0, 0.0], ConstraintOp::Eq, 4.0);
        problem
    }

    #[test]
    fn test_analysis_binding() {
        let analysis = Analysis::compute(&diet(), &[4.0, 0.0], 1e-6);

        assert_eq!(analysis.activities.len(), 3);
        assert_eq!(analysis.activities[1].slack, 6.0);
        assert_eq!(analysis.binding_constraints, vec!["protein", "exact"]);
    }

    #[test]
    fn test_violations_sorted() {
        let violations = find_violations(&diet(), &[0.0, 1.0], 1e-6);

        println!("{:#?}", violations);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].constraint, "protein");
        assert_eq!(violations[0].violation_amount, 8.0);
        assert_eq!(violations[1].constraint, "exact");
        assert!(violations[1].description.contains("requires exactly 4.00"));
    }
}
