use thiserror::Error;

use crate::model::Program;

/// Variable values and objective of a solved program.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// One value per variable, indexed by [`crate::model::Var::index`].
    pub values: Vec<f64>,
    /// Objective at `values`.
    pub objective: f64,
}

/// Why a solver returned no usable solution.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("the model is infeasible")]
    Infeasible,

    #[error("the model is unbounded")]
    Unbounded,

    /// The program uses something this backend cannot express.
    #[error("unsupported by this backend: {0}")]
    Unsupported(String),

    /// The engine stopped without an optimal solution, or returned values
    /// that cannot be read as a plan.
    #[error("solver failed: {0}")]
    Failed(String),
}

impl SolveError {
    /// Short status word for diagnostics.
    pub fn status(&self) -> &'static str {
        match self {
            SolveError::Infeasible => "infeasible",
            SolveError::Unbounded => "unbounded",
            SolveError::Unsupported(_) => "unsupported",
            SolveError::Failed(_) => "failed",
        }
    }
}

/// A mixed-integer engine that minimizes a [`Program`].
pub trait Solver {
    /// Minimize `program`, returning one value per variable.
    fn solve(&self, program: &Program) -> Result<Solution, SolveError>;
}

impl<S: Solver + ?Sized> Solver for &S {
    fn solve(&self, program: &Program) -> Result<Solution, SolveError> { (**self).solve(program) }
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn solve(&self, program: &Program) -> Result<Solution, SolveError> { (**self).solve(program) }
}
