//! Balanced transportation problems: initial allocations from the
//! North-West-Corner and Least-Cost rules, and the exact optimum through the
//! simplex solver.

use thiserror::Error;
use tracing::debug;

use crate::problem::{ConstraintOp, LpProblem, ProblemError};
use crate::simplex::Solver;
use crate::solution::SolutionStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Cost matrix is {rows}x{columns} but there are {sources} sources and {destinations} destinations")]
    Dimension {
        rows: usize,
        columns: usize,
        sources: usize,
        destinations: usize,
    },
    #[error("Negative value in {0}")]
    Negative(String),
    #[error("Non-finite value in {0}")]
    NonFinite(String),
    #[error("Total supply {supply} does not match total demand {demand}")]
    Unbalanced { supply: f64, demand: f64 },
    #[error("Simplex did not reach an optimum: {0}")]
    NotOptimal(SolutionStatus),
    #[error(transparent)]
    Problem(#[from] ProblemError),
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TransportProblem {
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
    pub supply: Vec<f64>,
    pub demand: Vec<f64>,
    /// `costs[i][j]` is the unit cost from source `i` to destination `j`
    pub costs: Vec<Vec<f64>>,
}

/// A shipment plan
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// `quantities[i][j]` shipped from source `i` to destination `j`
    pub quantities: Vec<Vec<f64>>,
    pub total_cost: f64,
}

impl Allocation {
    fn new(quantities: Vec<Vec<f64>>, costs: &[Vec<f64>]) -> Self {
        let total_cost = quantities
            .iter()
            .zip(costs)
            .flat_map(|(q_row, c_row)| q_row.iter().zip(c_row).map(|(q, c)| q * c))
            .sum();
        Self { quantities, total_cost }
    }

    /// Cells with a positive shipment as `(source, destination, quantity)`
    pub fn shipments(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.quantities.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &q)| q > 0.0)
                .map(move |(j, &q)| (i, j, q))
        })
    }
}

fn check_values(values: &[f64], what: &str) -> Result<(), TransportError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(TransportError::NonFinite(what.to_string()));
    }
    if values.iter().any(|&v| v < 0.0) {
        return Err(TransportError::Negative(what.to_string()));
    }
    Ok(())
}

impl TransportProblem {
    /// Sources and destinations are named `S1..` and `D1..`
    pub fn new(supply: Vec<f64>, demand: Vec<f64>, costs: Vec<Vec<f64>>) -> Self {
        Self {
            sources: (1..=supply.len()).map(|i| format!("S{}", i)).collect(),
            destinations: (1..=demand.len()).map(|j| format!("D{}", j)).collect(),
            supply,
            demand,
            costs,
        }
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        let (m, n) = (self.supply.len(), self.demand.len());
        let ragged = self.costs.iter().any(|row| row.len() != n);
        if self.costs.len() != m || ragged || self.sources.len() != m || self.destinations.len() != n {
            return Err(TransportError::Dimension {
                rows: self.costs.len(),
                columns: self.costs.first().map_or(0, Vec::len),
                sources: self.sources.len(),
                destinations: self.destinations.len(),
            });
        }

        check_values(&self.supply, "supply")?;
        check_values(&self.demand, "demand")?;
        for row in &self.costs {
            check_values(row, "costs")?;
        }

        let supply: f64 = self.supply.iter().sum();
        let demand: f64 = self.demand.iter().sum();
        if (supply - demand).abs() > 1e-9 * supply.max(demand).max(1.0) {
            return Err(TransportError::Unbalanced { supply, demand });
        }
        Ok(())
    }

    /// Fill cells starting at the top-left, moving right when a destination is
    /// satisfied and down when a source is exhausted.
    pub fn north_west_corner(&self) -> Result<Allocation, TransportError> {
        self.validate()?;
        let mut supply = self.supply.clone();
        let mut demand = self.demand.clone();
        let (m, n) = (supply.len(), demand.len());
        let mut quantities = vec![vec![0.0; n]; m];

        let (mut i, mut j) = (0, 0);
        while i < m && j < n {
            let quantity = supply[i].min(demand[j]);
            quantities[i][j] = quantity;
            supply[i] -= quantity;
            demand[j] -= quantity;

            if supply[i] <= 0.0 {
                i += 1;
            }
            if demand[j] <= 0.0 {
                j += 1;
            }
        }

        Ok(Allocation::new(quantities, &self.costs))
    }

    /// Repeatedly fill the cheapest cell whose source and destination are both
    /// still open. Ties go to the first cell in row-major order.
    pub fn least_cost(&self) -> Result<Allocation, TransportError> {
        self.validate()?;
        let mut supply = self.supply.clone();
        let mut demand = self.demand.clone();
        let (m, n) = (supply.len(), demand.len());
        let mut quantities = vec![vec![0.0; n]; m];

        loop {
            let mut cheapest: Option<(usize, usize)> = None;
            for i in (0..m).filter(|&i| supply[i] > 0.0) {
                for j in (0..n).filter(|&j| demand[j] > 0.0) {
                    let better = match cheapest {
                        Some((bi, bj)) => self.costs[i][j] < self.costs[bi][bj],
                        None => true,
                    };
                    if better {
                        cheapest = Some((i, j));
                    }
                }
            }

            let Some((i, j)) = cheapest else {
                break;
            };
            let quantity = supply[i].min(demand[j]);
            quantities[i][j] += quantity;
            supply[i] -= quantity;
            demand[j] -= quantity;
        }

        Ok(Allocation::new(quantities, &self.costs))
    }

    /// One variable per route, equality rows for every supply and demand
    pub fn to_lp_problem(&self) -> Result<LpProblem, TransportError> {
        self.validate()?;
        let (m, n) = (self.supply.len(), self.demand.len());

        let variables = self
            .sources
            .iter()
            .flat_map(|s| self.destinations.iter().map(move |d| format!("{}->{}", s, d)))
            .collect();
        let mut problem = LpProblem::new(variables);
        problem.set_objective(self.costs.iter().flatten().copied().collect(), true);

        for (i, source) in self.sources.iter().enumerate() {
            let coefficients = (0..m * n).map(|k| if k / n == i { 1.0 } else { 0.0 }).collect();
            problem.add_constraint(format!("Supply_{}", source), coefficients, ConstraintOp::Eq, self.supply[i]);
        }
        for (j, destination) in self.destinations.iter().enumerate() {
            let coefficients = (0..m * n).map(|k| if k % n == j { 1.0 } else { 0.0 }).collect();
            problem.add_constraint(format!("Demand_{}", destination), coefficients, ConstraintOp::Eq, self.demand[j]);
        }

        Ok(problem)
    }

    /// Minimum-cost allocation found by the simplex solver
    pub fn solve_optimal(&self, solver: &Solver) -> Result<Allocation, TransportError> {
        let problem = self.to_lp_problem()?;
        let solution = solver.solve(&problem)?;
        if !solution.is_optimal() {
            return Err(TransportError::NotOptimal(solution.status));
        }
        debug!(iterations = solution.iterations, cost = solution.objective_value, "transport optimum");

        let n = self.demand.len();
        let quantities = solution.values.chunks(n).map(<[f64]>::to_vec).collect();
        Ok(Allocation::new(quantities, &self.costs))
    }
}
