use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use polars::frame::DataFrame;

use crate::{config::SymmetryPolicy, error::ZoneError, io::csv, map::BeatMap};

impl BeatMap {
    /// Load a map from an adjacency matrix CSV and a `<beat>,<workload>` listing.
    pub fn read_from_csv(adjacency_path: &Path, workload_path: &Path, policy: SymmetryPolicy) -> Result<Self> {
        let adjacency = csv::read_headerless_csv(adjacency_path)?;
        let workloads = csv::read_workload_csv(workload_path)?;
        tracing::info!("[map::read] read {} adjacency lines and {} workload lines", adjacency.height(), workloads.height());

        Self::from_frames(&adjacency, &workloads, policy)
            .with_context(|| format!("[map::read] Failed to load beats from {} and {}", adjacency_path.display(), workload_path.display()))
    }

    /// Load a map from adjacency and workload CSV text.
    pub fn read_from_csv_str(adjacency: &str, workloads: &str, policy: SymmetryPolicy) -> Result<Self> {
        Self::from_frames(
            &csv::read_headerless_csv_string(adjacency)?,
            &csv::read_workload_csv_string(workloads)?,
            policy,
        )
    }

    /// Merge the parsed tables by beat id. Every header beat needs a workload
    /// and every workload needs a header beat.
    fn from_frames(adjacency: &DataFrame, workloads: &DataFrame, policy: SymmetryPolicy) -> Result<Self> {
        let table = csv::parse_adjacency(adjacency)?;
        let workloads = csv::parse_workloads(workloads)?;

        let mut by_beat = workloads.iter()
            .map(|(beat, workload)| (beat.as_str(), *workload))
            .collect::<HashMap<_, _>>();

        let ordered = table.beats.iter()
            .map(|beat| by_beat.remove(beat.as_str())
                .ok_or_else(|| ZoneError::MissingData(format!("beat '{beat}' has no workload entry"))))
            .collect::<Result<Vec<f64>, _>>()?;

        if !by_beat.is_empty() {
            let mut extra = by_beat.into_keys().collect::<Vec<_>>();
            extra.sort_unstable();
            return Err(ZoneError::MissingData(format!("workload listed for beats not in the adjacency header: {}", extra.join(", "))).into());
        }

        let adjacency = table.rows.iter()
            .map(|row| row.iter().enumerate().filter(|&(_, &flag)| flag).map(|(j, _)| j).collect())
            .collect::<Vec<Vec<usize>>>();

        Self::from_adjacency(table.beats, &adjacency, ordered, policy)
    }
}
