use crate::solution::SolutionStatus;
use crate::tableau::Tableau;

/// A pivot about to be applied
#[derive(Debug, Clone, Copy)]
pub struct Iteration<'a> {
    /// 1-based iteration counter
    pub number: usize,
    /// Tableau before the pivot
    pub tableau: &'a Tableau,
    pub entering: usize,
    pub leaving: usize,
    pub pivot: f64,
}

impl Iteration<'_> {
    pub fn entering_name(&self) -> &str {
        self.tableau.column_name(self.entering)
    }

    /// Name of the basic variable leaving the basis
    pub fn leaving_name(&self) -> &str {
        self.tableau.basic_name(self.leaving)
    }
}

/// Hook invoked by the solver once per iteration and once on termination
pub trait IterationObserver {
    fn on_iteration(&mut self, iteration: &Iteration<'_>);

    fn on_finish(&mut self, _tableau: &Tableau, _status: SolutionStatus) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl IterationObserver for NoopObserver {
    fn on_iteration(&mut self, _iteration: &Iteration<'_>) {}
}
