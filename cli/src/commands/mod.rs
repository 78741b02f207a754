pub mod solve;
pub mod summarize;
pub mod validate;
