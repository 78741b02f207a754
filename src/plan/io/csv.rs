use std::{collections::HashMap, path::Path, sync::Arc};

use anyhow::{Context, Result};

use crate::{error::ZoneError, io::csv::{self, ResultRow}, map::BeatMap, plan::ZonePlan};

impl ZonePlan {
    /// Result table rows in map order, numbered from 1.
    pub(crate) fn to_rows(&self) -> Vec<ResultRow> {
        self.assignments.iter().enumerate()
            .map(|(i, &zone)| ResultRow {
                no: i + 1,
                beat: self.map().beat(i).to_string(),
                zone,
                workload: self.map().workload(i),
            })
            .collect()
    }

    /// Write the plan as a `,beat,zone,workload` result table.
    pub fn write_to_csv(&self, path: &Path) -> Result<()> {
        csv::write_result_table(&self.to_rows(), path)
    }

    /// Render the result table as a string.
    pub fn to_csv(&self) -> Result<String> {
        csv::write_result_table_string(&self.to_rows())
    }

    /// Load a plan for `map` from a result table file.
    pub fn read_from_csv(map: impl Into<Arc<BeatMap>>, num_zones: u32, path: &Path) -> Result<Self> {
        let df = csv::read_headerless_csv(path)?;
        Self::from_rows(map.into(), num_zones, &csv::parse_result_table(&df)?)
            .with_context(|| format!("[plan::read_from_csv] Failed to load plan from {}", path.display()))
    }

    /// Load a plan for `map` from result table text.
    pub fn from_csv_str(map: impl Into<Arc<BeatMap>>, num_zones: u32, text: &str) -> Result<Self> {
        let df = csv::read_headerless_csv_string(text)?;
        Self::from_rows(map.into(), num_zones, &csv::parse_result_table(&df)?)
    }

    fn from_rows(map: Arc<BeatMap>, num_zones: u32, rows: &[ResultRow]) -> Result<Self> {
        let mut assignments = HashMap::with_capacity(rows.len());
        for (row, record) in rows.iter().zip(2..) {
            if assignments.insert(row.beat.clone(), row.zone).is_some() {
                return Err(ZoneError::parse("result", record, format!("duplicate beat id '{}'", row.beat)).into());
            }
            if let Some(i) = map.index_of(&row.beat) {
                let expected = map.workload(i);
                if (row.workload - expected).abs() > 1e-6 * expected.abs().max(1.0) {
                    tracing::warn!("[plan::read] beat '{}' has workload {} in the result table but {} in the map", row.beat, row.workload, expected);
                }
            }
        }
        Self::from_assignments(map, num_zones, &assignments)
    }
}
