use tableau_solver::assignment::{Assignment, AssignmentProblem};
use tableau_solver::graphical::GraphicalSolution;
use tableau_solver::transport::{Allocation, TransportProblem};
use tableau_solver::{Iteration, IterationObserver, LpProblem, Solution, SolutionStatus, Tableau};

/// Render a tableau with one labeled row per basic variable and a final `Z` row
pub fn format_tableau(tableau: &Tableau) -> String {
    let mut lines = Vec::with_capacity(tableau.num_rows() + 3);

    let names: String = tableau.column_names().iter().map(|name| format!("{:>11}", name)).collect();
    lines.push(format!("{:>8}{}{:>13}", "Basis", names, "RHS"));
    lines.push("-".repeat(8 + 11 * tableau.num_columns() + 13));

    for i in 0..tableau.num_rows() {
        let (coefficients, rhs) = tableau.row(i).split_at(tableau.num_columns());
        lines.push(format_row(tableau.basic_name(i), coefficients, rhs[0]));
    }
    lines.push(format_row("Z", &tableau.objective_row(), tableau.objective_rhs()));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn format_row(label: &str, coefficients: &[f64], rhs: f64) -> String {
    let cells: String = coefficients.iter().map(|&v| format!("{:>11}", format_number(v))).collect();
    format!("{:>8}{}{:>13}", label, cells, format_number(rhs))
}

fn format_number(value: f64) -> String {
    if value.abs() >= 1e6 {
        format!("{:.3e}", value)
    } else {
        format!("{:.3}", value)
    }
}

/// Prints every tableau the solver pivots on
#[derive(Debug, Default)]
pub struct TracePrinter;

impl IterationObserver for TracePrinter {
    fn on_iteration(&mut self, iteration: &Iteration<'_>) {
        let basis: Vec<&str> = (0..iteration.tableau.num_rows())
            .map(|i| iteration.tableau.basic_name(i))
            .collect();

        println!("{}", "=".repeat(60));
        println!("Iteration {:>4}  |  Basic variables: [{}]", iteration.number, basis.join(", "));
        println!("{}", "=".repeat(60));
        print!("{}", format_tableau(iteration.tableau));
        println!();
        println!("  Entering variable: {} (most negative reduced cost)", iteration.entering_name());
        println!("  Leaving variable:  {} (minimum ratio test)", iteration.leaving_name());
        println!("  Pivot element:     {:.3}", iteration.pivot);
        println!();
    }

    fn on_finish(&mut self, tableau: &Tableau, status: SolutionStatus) {
        println!("{}", "=".repeat(60));
        println!("Final tableau ({})", status);
        println!("{}", "=".repeat(60));
        print!("{}", format_tableau(tableau));
        println!();
    }
}

pub fn print_solution(problem: &LpProblem, solution: &Solution) {
    println!("Status: {}", solution.status);
    println!("Iterations: {}", solution.iterations);

    match solution.status {
        SolutionStatus::Optimal => {
            let sense = if problem.objective.minimize { "Minimum" } else { "Maximum" };
            println!("{} objective: {:.4}", sense, solution.objective_value);
            println!();
            println!("Variables:");
            for (name, value) in problem.variables.iter().zip(&solution.values) {
                println!("  {:20} {:12.4}", name, value);
            }
            println!();
            println!("Constraints:");
            for a in &solution.analysis.activities {
                println!(
                    "  {:20} {:12.4} {} {:<12.4} {}",
                    a.constraint,
                    a.lhs,
                    a.op,
                    a.rhs,
                    if a.binding { "binding" } else { "" }
                );
            }
        }
        SolutionStatus::Infeasible => {
            println!("No solution satisfies all constraints.");
            for v in &solution.violations {
                println!("  - {}", v.description);
            }
        }
        SolutionStatus::Unbounded => {
            println!("The objective can be improved without limit.");
        }
        SolutionStatus::DegenerateLimit => {
            println!("Stopped before reaching an optimum (iteration limit or unreliable pivot).");
        }
    }
}

pub fn print_graphical(problem: &LpProblem, solution: &GraphicalSolution) {
    println!("Status: {}", solution.status);
    if !solution.bounded_region {
        println!("The feasible region is unbounded.");
    }
    if solution.vertices.is_empty() {
        return;
    }

    println!();
    println!("Vertices of the feasible region:");
    println!("  {:>10} {:>10} {:>12}", problem.variables[0], problem.variables[1], "Z");
    for v in &solution.vertices {
        println!("  {:>10.4} {:>10.4} {:>12.4}", v.x, v.y, v.objective);
    }

    if let Some(optimum) = solution.optimum {
        println!();
        println!(
            "Optimal solution: {} = {:.4}, {} = {:.4}, Z = {:.4}",
            problem.variables[0], optimum.x, problem.variables[1], optimum.y, optimum.objective
        );
    }
}

pub fn print_allocation(problem: &TransportProblem, allocation: &Allocation, method: &str) {
    println!("{}:", method);
    print!("  {:8}", "");
    for d in &problem.destinations {
        print!("{:>10}", d);
    }
    println!("{:>10}", "Supply");

    for (i, row) in allocation.quantities.iter().enumerate() {
        print!("  {:8}", problem.sources[i]);
        for q in row {
            print!("{:>10.2}", q);
        }
        println!("{:>10.2}", problem.supply[i]);
    }

    for (i, j, q) in allocation.shipments() {
        println!(
            "  {} -> {}: {:.2} units x {} = {:.2}",
            problem.sources[i],
            problem.destinations[j],
            q,
            problem.costs[i][j],
            q * problem.costs[i][j]
        );
    }
    println!("  Total cost: {:.2}", allocation.total_cost);
    println!();
}

pub fn print_assignment(problem: &AssignmentProblem, assignment: &Assignment) {
    println!("Optimal assignment:");
    for &(i, j) in &assignment.pairs {
        println!("  {} -> {} ({})", problem.rows[i], problem.columns[j], problem.matrix[i][j]);
    }
    let label = if problem.maximize { "Total profit" } else { "Total cost" };
    println!("{}: {}", label, assignment.total);
}
