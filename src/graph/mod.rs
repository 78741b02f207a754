mod contiguity;
mod graph;

pub(crate) use graph::Graph;
