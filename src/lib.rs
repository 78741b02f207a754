#![doc = "Contiguous, workload-balanced zoning of patrol beats as a mixed-integer program"]
mod config;
mod error;
mod graph;
mod io;
mod map;
mod model;
mod plan;
mod solver;

#[doc(inline)]
pub use config::{Backend, SymmetryPolicy, ZoneConfig};

#[doc(inline)]
pub use error::ZoneError;

#[doc(inline)]
pub use map::BeatMap;

#[doc(inline)]
pub use model::{Constraint, LinearExpr, Program, QuadraticExpr, Sense, Var, VarDef, VarKind, ZoneModel};

#[doc(inline)]
pub use plan::{Summary, Violation, ZonePlan, ZoneSummary};

#[doc(inline)]
pub use solver::{MilpSolver, SolveError, Solution, Solver};
