use std::collections::HashMap;

use anyhow::Result;

use crate::{config::SymmetryPolicy, error::ZoneError, graph::Graph};

/// The beats to be districted: ids, workloads, and their adjacency graph.
///
/// Beats are indexed in input order; every other structure in the crate
/// (model variables, assignments, result rows) follows that order.
#[derive(Clone, Debug)]
pub struct BeatMap {
    beats: Vec<String>,
    index: HashMap<String, usize>,
    graph: Graph,
}

impl BeatMap {
    /// Build a map from `(beat, workload)` pairs and a list of adjacent beat pairs.
    ///
    /// Edges may be listed in one or both directions, in any order.
    pub fn new<S: AsRef<str>>(beats: Vec<(String, f64)>, edges: &[(S, S)]) -> Result<Self> {
        let ids = beats.iter().map(|(id, _)| id.clone()).collect::<Vec<_>>();
        let index = Self::build_index(&ids)?;

        let mut adjacency = vec![vec![]; ids.len()];
        for (a, b) in edges {
            let (a, b) = (a.as_ref(), b.as_ref());
            let u = *index.get(a).ok_or_else(|| ZoneError::MissingData(format!("edge references unknown beat '{a}'")))?;
            let v = *index.get(b).ok_or_else(|| ZoneError::MissingData(format!("edge references unknown beat '{b}'")))?;
            adjacency[u].push(v);
            adjacency[v].push(u);
        }

        let workloads = beats.into_iter().map(|(_, workload)| workload).collect();
        Self::from_adjacency(ids, &adjacency, workloads, SymmetryPolicy::Symmetrize)
    }

    /// Build a map from per-beat adjacency lists (indices into `beats`) and
    /// workloads, checking symmetry under `policy`.
    pub(crate) fn from_adjacency(beats: Vec<String>, adjacency: &[Vec<usize>], workloads: Vec<f64>, policy: SymmetryPolicy) -> Result<Self> {
        assert!(adjacency.len() == beats.len(), "adjacency.len() must equal beats.len()");
        assert!(workloads.len() == beats.len(), "workloads.len() must equal beats.len()");
        let index = Self::build_index(&beats)?;

        let (graph, added) = Graph::symmetrized(adjacency, workloads);
        if let Some(&(a, b)) = added.first() {
            if policy == SymmetryPolicy::Strict {
                return Err(ZoneError::AsymmetricAdjacency { a: beats[a].clone(), b: beats[b].clone() }.into());
            }
            for &(a, b) in &added {
                tracing::warn!("[map] '{}' lists '{}' as adjacent but not the reverse; adding the reverse", beats[a], beats[b]);
            }
        }

        Ok(Self { beats, index, graph })
    }

    fn build_index(beats: &[String]) -> Result<HashMap<String, usize>> {
        let mut index = HashMap::with_capacity(beats.len());
        for (i, id) in beats.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(ZoneError::parse("beats", i + 1, format!("duplicate beat id '{id}'")).into());
            }
        }
        Ok(index)
    }

    /// Number of beats.
    #[inline] pub fn len(&self) -> usize { self.beats.len() }

    /// Check if the map has no beats.
    #[inline] pub fn is_empty(&self) -> bool { self.beats.is_empty() }

    /// Beat ids in index order.
    #[inline] pub fn beats(&self) -> &[String] { &self.beats }

    /// Id of the beat at `index`.
    #[inline] pub fn beat(&self, index: usize) -> &str { &self.beats[index] }

    /// Index of a beat id.
    #[inline] pub fn index_of(&self, beat: &str) -> Option<usize> { self.index.get(beat).copied() }

    /// Workload of the beat at `index`.
    #[inline] pub fn workload(&self, index: usize) -> f64 { self.graph.node_weight(index) }

    /// Workloads in index order.
    #[inline] pub fn workloads(&self) -> &[f64] { self.graph.node_weights() }

    /// Sum of all workloads.
    #[inline] pub fn total_workload(&self) -> f64 { self.graph.total_weight() }

    /// Ids of the beats adjacent to `beat`, or `None` for an unknown beat.
    pub fn neighbors(&self, beat: &str) -> Option<Vec<&str>> {
        let u = self.index_of(beat)?;
        Some(self.graph.edges(u).map(|v| self.beats[v].as_str()).collect())
    }

    /// Number of undirected adjacencies.
    #[inline] pub fn adjacency_count(&self) -> usize { self.graph.edge_count() / 2 }

    /// Check whether every beat can reach every other beat.
    pub fn is_connected(&self) -> bool {
        self.graph.components().iter().all(|&c| c == 0)
    }

    /// Get a reference to the adjacency graph.
    #[inline] pub(crate) fn graph(&self) -> &Graph { &self.graph }
}
