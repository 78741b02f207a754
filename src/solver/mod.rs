//! Solver boundary: anything that can minimize a [`crate::model::Program`].

mod milp;
mod solver;

pub use milp::MilpSolver;
pub use solver::{SolveError, Solution, Solver};
