//! Tabular input and output.

pub(crate) mod csv;
