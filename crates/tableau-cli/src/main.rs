mod render;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use tableau_solver::assignment::AssignmentProblem;
use tableau_solver::transport::TransportProblem;
use tableau_solver::{graphical, BigM, LpProblem, SolutionStatus, Solver};

#[derive(Parser)]
#[command(name = "tableau")]
#[command(about = "Big-M tableau simplex with transportation and assignment solvers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    solver: SolverArgs,
}

#[derive(Args)]
struct SolverArgs {
    /// Maximum pivots before giving up
    #[arg(long, global = true, default_value_t = 5000)]
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    #[arg(long, global = true, default_value_t = 1e-9)]
    tolerance: f64,
    /// Big-M as a multiple of the largest cost magnitude
    #[arg(long, global = true, default_value_t = 1e6)]
    big_m_factor: f64,
    /// Fixed Big-M penalty (overrides --big-m-factor)
    #[arg(long, global = true)]
    big_m: Option<f64>,
}

impl SolverArgs {
    fn build(&self) -> Solver {
        let big_m = match self.big_m {
            Some(value) => BigM::Fixed(value),
            None => BigM::Scaled(self.big_m_factor),
        };
        Solver::new()
            .with_max_iterations(self.max_iterations)
            .with_tolerance(self.tolerance)
            .with_big_m(big_m)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    Nwc,
    LeastCost,
    Optimal,
    All,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an LP problem with the Big-M simplex method
    Solve {
        /// JSON file containing the problem
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: Format,
        /// Print the tableau at every iteration
        #[arg(short, long)]
        trace: bool,
    },
    /// Solve a two-variable LP problem by enumerating the corners of its feasible region
    Graph {
        /// JSON file containing the problem
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: Format,
    },
    /// Solve a balanced transportation problem
    Transport {
        /// JSON file containing supply, demand and costs
        file: PathBuf,
        /// Allocation method
        #[arg(short, long, value_enum, default_value = "all")]
        method: Method,
    },
    /// Solve an assignment problem with the Hungarian algorithm
    Assign {
        /// JSON file containing the cost or profit matrix
        file: PathBuf,
    },
    /// Check an LP problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

fn read_json<T: DeserializeOwned>(file: &Path) -> T {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", file.display(), e);
            std::process::exit(1);
        }
    };

    match serde_json::from_str(&source) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Parse error in {}: {}", file.display(), e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }
}

fn exit_unless_optimal(status: SolutionStatus) {
    if status != SolutionStatus::Optimal {
        std::process::exit(1);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let solver = cli.solver.build();

    match cli.command {
        Commands::Solve { file, format, trace } => {
            let problem: LpProblem = read_json(&file);

            let result = if trace {
                solver.solve_with_observer(&problem, &mut render::TracePrinter)
            } else {
                solver.solve(&problem)
            };
            let solution = match result {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Invalid problem: {}", e);
                    std::process::exit(1);
                }
            };

            match format {
                Format::Json => print_json(&solution),
                Format::Pretty => render::print_solution(&problem, &solution),
            }
            exit_unless_optimal(solution.status);
        }
        Commands::Graph { file, format } => {
            let problem: LpProblem = read_json(&file);

            let solution = match graphical::solve(&problem) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Invalid problem: {}", e);
                    std::process::exit(1);
                }
            };

            match format {
                Format::Json => print_json(&solution),
                Format::Pretty => render::print_graphical(&problem, &solution),
            }
            exit_unless_optimal(solution.status);
        }
        Commands::Transport { file, method } => {
            let problem: TransportProblem = read_json(&file);

            let mut runs = Vec::new();
            if matches!(method, Method::Nwc | Method::All) {
                runs.push(("North-West Corner", problem.north_west_corner()));
            }
            if matches!(method, Method::LeastCost | Method::All) {
                runs.push(("Least Cost", problem.least_cost()));
            }
            if matches!(method, Method::Optimal | Method::All) {
                runs.push(("Optimal (simplex)", problem.solve_optimal(&solver)));
            }

            for (label, result) in runs {
                match result {
                    Ok(allocation) => render::print_allocation(&problem, &allocation, label),
                    Err(e) => {
                        eprintln!("{}: {}", label, e);
                        std::process::exit(1);
                    }
                }
            }
        }
        Commands::Assign { file } => {
            let problem: AssignmentProblem = read_json(&file);

            match problem.solve() {
                Ok(assignment) => render::print_assignment(&problem, &assignment),
                Err(e) => {
                    eprintln!("Invalid assignment problem: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { file } => {
            let problem: LpProblem = read_json(&file);

            match problem.validate() {
                Ok(()) => {
                    let sense = if problem.objective.minimize { "minimize" } else { "maximize" };
                    println!("✓ {} is valid", file.display());
                    println!("  {} variables", problem.num_variables());
                    println!("  {} constraints", problem.num_constraints());
                    println!("  objective: {}", sense);
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
