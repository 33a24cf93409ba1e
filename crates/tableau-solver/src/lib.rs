pub mod assignment;
pub mod graphical;
mod observer;
mod problem;
mod simplex;
mod solution;
mod standard_form;
mod tableau;
pub mod transport;

pub use observer::{Iteration, IterationObserver, NoopObserver};
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective, ProblemError};
pub use simplex::{BigM, Solver};
pub use solution::{find_violations, Analysis, ConstraintActivity, ConstraintViolation, Solution, SolutionStatus};
pub use standard_form::{ColumnKind, StandardForm, StandardRow};
pub use tableau::{RatioTest, Tableau};
