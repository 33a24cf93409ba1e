use tracing::{debug, info, trace, warn};

use crate::observer::{Iteration, IterationObserver, NoopObserver};
use crate::problem::{LpProblem, ProblemError};
use crate::solution::{find_violations, Analysis, Solution, SolutionStatus};
use crate::standard_form::StandardForm;
use crate::tableau::{RatioTest, Tableau};

/// Penalty charged per unit of an artificial variable
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BigM {
    /// `M = factor * max(1, max |c_j|)`
    Scaled(f64),
    /// A fixed penalty regardless of the costs
    Fixed(f64),
}

impl Default for BigM {
    fn default() -> Self {
        BigM::Scaled(1e6)
    }
}

impl BigM {
    fn resolve(self, cost_scale: f64) -> f64 {
        match self {
            BigM::Scaled(factor) => factor * cost_scale,
            BigM::Fixed(value) => value,
        }
    }
}

/// Big-M tableau simplex solver for linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots before reporting `DegenerateLimit`
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Pivot elements at or below this are not trusted
    pivot_tolerance: f64,
    /// Relative tolerance for binding and violation reports
    feasibility_tolerance: f64,
    big_m: BigM,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            tolerance: 1e-9,
            pivot_tolerance: 1e-7,
            feasibility_tolerance: 1e-6,
            big_m: BigM::default(),
        }
    }
}

enum SimplexResult {
    Optimal,
    Unbounded,
    Stalled,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Also raises the pivot tolerance to `tol` when it is smaller
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self.pivot_tolerance = self.pivot_tolerance.max(tol);
        self
    }

    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Self {
        self.feasibility_tolerance = tol;
        self
    }

    pub fn with_big_m(mut self, big_m: BigM) -> Self {
        self.big_m = big_m;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn pivot_tolerance(&self) -> f64 {
        self.pivot_tolerance
    }

    pub fn big_m(&self) -> BigM {
        self.big_m
    }

    pub fn validate(&self) -> Result<(), ProblemError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if self.max_iterations == 0 {
            return Err(ProblemError::InvalidConfig("max_iterations must be at least 1".into()));
        }
        if !positive(self.tolerance) {
            return Err(ProblemError::InvalidConfig(format!("tolerance {} must be positive", self.tolerance)));
        }
        if !positive(self.pivot_tolerance) || self.pivot_tolerance < self.tolerance {
            return Err(ProblemError::InvalidConfig(format!(
                "pivot tolerance {} must be positive and at least the tolerance {}",
                self.pivot_tolerance, self.tolerance
            )));
        }
        if !positive(self.feasibility_tolerance) {
            return Err(ProblemError::InvalidConfig(format!(
                "feasibility tolerance {} must be positive",
                self.feasibility_tolerance
            )));
        }
        match self.big_m {
            BigM::Scaled(v) | BigM::Fixed(v) if !positive(v) => {
                Err(ProblemError::InvalidConfig(format!("Big-M value {} must be positive", v)))
            }
            _ => Ok(()),
        }
    }

    /// Solve the LP problem using the Big-M tableau method
    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, ProblemError> {
        self.solve_with_observer(problem, &mut NoopObserver)
    }

    /// Solve, reporting every pivot and the final tableau to `observer`
    pub fn solve_with_observer<O>(&self, problem: &LpProblem, observer: &mut O) -> Result<Solution, ProblemError>
    where
        O: IterationObserver + ?Sized,
    {
        self.validate()?;
        problem.validate()?;

        let form = StandardForm::from_problem(problem);
        let big_m = self.big_m.resolve(form.cost_scale());
        let mut tableau = Tableau::big_m(&form, big_m);

        trace!(
            rows = tableau.num_rows(),
            columns = tableau.num_columns(),
            slack = form.n_slack,
            artificial = form.n_artificial,
            big_m,
            "built initial tableau"
        );

        let cost_tolerance = self.tolerance * form.cost_scale();
        let (result, iterations) = self.iterate(&mut tableau, cost_tolerance, observer);

        let residual = tableau.max_basic_artificial();
        let artificial_left = residual > self.tolerance * form.rhs_scale();
        let status = match result {
            SimplexResult::Optimal if artificial_left => {
                debug!(residual, "artificial variable left in the basis");
                SolutionStatus::Infeasible
            }
            SimplexResult::Optimal => SolutionStatus::Optimal,
            // The penalized objective runs off along a ray, but no column can
            // lower the artificials any more: the constraints are contradictory
            SimplexResult::Unbounded if artificial_left && tableau.penalty_settled(self.tolerance) => {
                debug!(residual, "unbounded ray found with an artificial variable left in the basis");
                SolutionStatus::Infeasible
            }
            SimplexResult::Unbounded => {
                if artificial_left {
                    warn!(residual, "unbounded before the artificial variables left the basis");
                }
                SolutionStatus::Unbounded
            }
            SimplexResult::Stalled => SolutionStatus::DegenerateLimit,
        };

        observer.on_finish(&tableau, status);
        info!(%status, iterations, "simplex finished");

        Ok(self.extract_solution(&tableau, problem, status, iterations))
    }

    fn iterate<O>(&self, tableau: &mut Tableau, cost_tolerance: f64, observer: &mut O) -> (SimplexResult, usize)
    where
        O: IterationObserver + ?Sized,
    {
        for iteration in 0..self.max_iterations {
            let Some(entering) = tableau.entering_column(self.tolerance, cost_tolerance) else {
                return (SimplexResult::Optimal, iteration);
            };

            let leaving = match tableau.ratio_test(entering, self.tolerance, self.pivot_tolerance) {
                RatioTest::Leaving(row) => row,
                RatioTest::Unbounded => {
                    debug!(entering = tableau.column_name(entering), "no row limits the entering column");
                    return (SimplexResult::Unbounded, iteration);
                }
                RatioTest::Unreliable => {
                    warn!(
                        entering = tableau.column_name(entering),
                        "only near-zero pivot elements left, stopping"
                    );
                    return (SimplexResult::Stalled, iteration);
                }
            };

            let pivot = tableau.get(leaving, entering);
            observer.on_iteration(&Iteration {
                number: iteration + 1,
                tableau: &*tableau,
                entering,
                leaving,
                pivot,
            });

            debug!(
                iteration = iteration + 1,
                entering = tableau.column_name(entering),
                leaving = tableau.basic_name(leaving),
                pivot,
                "pivot"
            );
            tableau.pivot(leaving, entering);
        }

        if tableau.entering_column(self.tolerance, cost_tolerance).is_none() {
            return (SimplexResult::Optimal, self.max_iterations);
        }

        warn!(max_iterations = self.max_iterations, "iteration limit reached, probable cycling");
        (SimplexResult::Stalled, self.max_iterations)
    }

    fn extract_solution(
        &self,
        tableau: &Tableau,
        problem: &LpProblem,
        status: SolutionStatus,
        iterations: usize,
    ) -> Solution {
        let values: Vec<f64> = tableau
            .decision_values()
            .into_iter()
            .map(|v| if v.abs() <= self.tolerance { 0.0 } else { v })
            .collect();

        let objective_value = match status {
            SolutionStatus::Unbounded if problem.objective.minimize => f64::NEG_INFINITY,
            SolutionStatus::Unbounded => f64::INFINITY,
            _ => problem.evaluate(&values),
        };

        let violations = match status {
            SolutionStatus::Infeasible => find_violations(problem, &values, self.feasibility_tolerance),
            _ => Vec::new(),
        };

        let analysis = match status {
            SolutionStatus::Optimal | SolutionStatus::Infeasible => {
                Analysis::compute(problem, &values, self.feasibility_tolerance)
            }
            SolutionStatus::Unbounded | SolutionStatus::DegenerateLimit => Analysis::empty(),
        };

        Solution {
            status,
            values,
            objective_value,
            iterations,
            analysis,
            violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ConstraintOp, LpProblem};

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        //   x, y >= 0
        // Optimal: x=3, y=1, obj=11
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem).unwrap();

        println!("Status: {:?}", solution.status);
        println!("Values: {:?}", solution.values);
        println!("Objective: {}", solution.objective_value);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!((solution.objective_value - 11.0).abs() < 1e-6, "obj = {} (expected 11)", solution.objective_value);
        assert_eq!(solution.analysis.binding_constraints, vec!["sum", "x_max"]);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!((solution.objective_value - 9.0).abs() < 1e-6, "obj = {} (expected 9)", solution.objective_value);
    }

    #[test]
    fn test_infeasible() {
        // x >= 10
        // x <= 5
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("lower", vec![1.0], ConstraintOp::Ge, 10.0);
        problem.add_constraint("upper", vec![1.0], ConstraintOp::Le, 5.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert_eq!(solution.values.len(), 1);
        assert_eq!(solution.violations.len(), 1);
        assert_eq!(solution.violations[0].constraint, "lower");
    }

    #[test]
    fn test_unbounded() {
        // Maximize x + y with only x - y <= 2
        let mut problem = LpProblem::with_dimension(2);
        problem.set_objective(vec![1.0, 1.0], false);
        problem.add_constraint("diff", vec![1.0, -1.0], ConstraintOp::Le, 2.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Unbounded);
        assert_eq!(solution.objective_value, f64::INFINITY);
    }

    #[test]
    fn test_equality_with_negative_rhs() {
        // x + y = -3 has no non-negative solution
        let mut problem = LpProblem::with_dimension(2);
        problem.set_objective(vec![1.0, 2.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Eq, -3.0);
        assert_eq!(Solver::new().solve(&problem).unwrap().status, SolutionStatus::Infeasible);

        // -x - y <= -3 is x + y >= 3
        let mut problem = LpProblem::with_dimension(2);
        problem.set_objective(vec![1.0, 2.0], true);
        problem.add_constraint("sum", vec![-1.0, -1.0], ConstraintOp::Le, -3.0);
        let solution = Solver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6);
        assert!((solution.objective_value - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_iteration_cap() {
        let mut problem = LpProblem::with_dimension(2);
        problem.set_objective(vec![4.0, 3.0], true);
        problem.add_constraint("vitamins", vec![200.0, 100.0], ConstraintOp::Ge, 4000.0);
        problem.add_constraint("minerals", vec![1.0, 2.0], ConstraintOp::Ge, 50.0);
        problem.add_constraint("calories", vec![40.0, 40.0], ConstraintOp::Ge, 1400.0);

        let solution = Solver::new().with_max_iterations(1).solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::DegenerateLimit);
        assert_eq!(solution.iterations, 1);
    }

    #[test]
    fn test_observer_sees_every_pivot() {
        struct Recorder {
            pivots: Vec<(usize, String, String)>,
            finished: Option<SolutionStatus>,
        }

        impl IterationObserver for Recorder {
            fn on_iteration(&mut self, iteration: &Iteration<'_>) {
                self.pivots.push((
                    iteration.number,
                    iteration.entering_name().to_string(),
                    iteration.leaving_name().to_string(),
                ));
            }

            fn on_finish(&mut self, _tableau: &Tableau, status: SolutionStatus) {
                self.finished = Some(status);
            }
        }

        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);

        let mut recorder = Recorder {
            pivots: Vec::new(),
            finished: None,
        };
        let solution = Solver::new().solve_with_observer(&problem, &mut recorder).unwrap();

        assert_eq!(solution.iterations, recorder.pivots.len());
        assert_eq!(recorder.pivots[0], (1, "x".to_string(), "s2".to_string()));
        assert_eq!(recorder.finished, Some(SolutionStatus::Optimal));
    }

    #[test]
    fn test_invalid_config() {
        let mut problem = LpProblem::with_dimension(1);
        problem.set_objective(vec![1.0], true);

        let solver = Solver::new().with_tolerance(-1.0);
        assert!(matches!(solver.solve(&problem), Err(ProblemError::InvalidConfig(_))));

        let solver = Solver::new().with_big_m(BigM::Fixed(0.0));
        assert!(matches!(solver.solve(&problem), Err(ProblemError::InvalidConfig(_))));
    }

    #[test]
    fn test_fixed_big_m() {
        let mut problem = LpProblem::with_dimension(2);
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);

        let solution = Solver::new().with_big_m(BigM::Fixed(1e4)).solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_mixed_cost_magnitudes() {
        // min 1000x - 0.5y, x + y >= 1, y <= 10
        // Optimal: y=10, obj=-5
        let mut problem = LpProblem::with_dimension(2);
        problem.set_objective(vec![1000.0, -0.5], true);
        problem.add_constraint("cover", vec![1.0, 1.0], ConstraintOp::Ge, 1.0);
        problem.add_constraint("cap", vec![0.0, 1.0], ConstraintOp::Le, 10.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![0.0, 10.0]);
        assert!((solution.objective_value + 5.0).abs() < 1e-9, "obj = {}", solution.objective_value);

        // Same shape with unit-scale costs and a tiny improving term
        problem.set_objective(vec![1.0, -0.0005], true);
        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value + 0.005).abs() < 1e-12, "obj = {}", solution.objective_value);
    }

    #[test]
    fn test_loose_tolerance_raises_pivot_tolerance() {
        let solver = Solver::new().with_tolerance(1e-6);
        assert_eq!(solver.pivot_tolerance(), 1e-6);
        assert!(solver.validate().is_ok());

        let solver = Solver::new().with_tolerance(1e-12);
        assert_eq!(solver.pivot_tolerance(), 1e-7);

        let solver = Solver::new().with_tolerance(1e-6).with_pivot_tolerance(1e-8);
        assert!(matches!(solver.validate(), Err(ProblemError::InvalidConfig(_))));
    }

    #[test]
    fn test_tiny_pivot_stops_instead_of_unbounded() {
        // Maximize x subject to 1e-8 x <= 1: the only pivot candidate is too small to trust
        let mut problem = LpProblem::with_dimension(1);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("tiny", vec![1e-8], ConstraintOp::Le, 1.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::DegenerateLimit);
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.values, vec![0.0]);
    }

    #[test]
    fn test_contradiction_with_free_direction_is_infeasible() {
        // Maximize y subject to x >= 10, x <= 5: y is unconstrained but no point is feasible
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![0.0, 1.0], false);
        problem.add_constraint("lower", vec![1.0, 0.0], ConstraintOp::Ge, 10.0);
        problem.add_constraint("upper", vec![1.0, 0.0], ConstraintOp::Le, 5.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert_eq!(solution.violations[0].constraint, "lower");
    }
}
