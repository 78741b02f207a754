//! Mixed-integer quadratic programs and the zoning model built on them.

mod program;
mod zoning;

pub use program::{Constraint, LinearExpr, Program, QuadraticExpr, Sense, Var, VarDef, VarKind};
pub use zoning::ZoneModel;
