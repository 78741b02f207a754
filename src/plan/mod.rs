mod io;
mod plan;
mod summary;
mod validate;

pub use plan::ZonePlan;
pub use summary::{Summary, ZoneSummary};
pub use validate::Violation;
