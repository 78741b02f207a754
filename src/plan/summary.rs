use std::{collections::BTreeMap, fmt, path::Path};

use anyhow::{Context, Result, ensure};
use serde::Serialize;

use crate::{io::csv, plan::ZonePlan};

/// Totals of one zone.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub zone: u32,
    pub beats: usize,
    /// Total workload divided by the summary's scale.
    pub workload: f64,
}

/// Workload balance statistics of a plan.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub zones: Vec<ZoneSummary>,
    pub mean: f64,
    /// Sample variance (n - 1 denominator), 0 for a single zone.
    pub variance: f64,
    pub population_variance: f64,
    pub min: f64,
    pub max: f64,
    /// Sum of squared deviations from the mean.
    pub balance_objective: f64,
}

impl Summary {
    /// Summarize a plan, dividing workloads by `scale`.
    pub fn from_plan(plan: &ZonePlan, scale: f64) -> Result<Self> {
        let zones = plan.zone_members().iter().zip(plan.zone_totals())
            .enumerate()
            .map(|(zone, (members, total))| (zone as u32, members.len(), total))
            .collect::<Vec<_>>();
        Self::from_zone_totals(zones, scale)
    }

    /// Summarize a result table written by [`ZonePlan::write_to_csv`]. Zones are
    /// the distinct values of the zone column; no map is needed.
    pub fn from_result_table(path: &Path, scale: f64) -> Result<Self> {
        let df = csv::read_headerless_csv(path)?;
        let rows = csv::parse_result_table(&df)
            .with_context(|| format!("[plan::summary] Failed to read result table {}", path.display()))?;
        ensure!(!rows.is_empty(), "[plan::summary] result table {} has no rows", path.display());

        let mut zones = BTreeMap::<u32, (usize, f64)>::new();
        for row in &rows {
            let entry = zones.entry(row.zone).or_default();
            entry.0 += 1;
            entry.1 += row.workload;
        }
        Self::from_zone_totals(zones.into_iter().map(|(zone, (beats, total))| (zone, beats, total)).collect(), scale)
    }

    fn from_zone_totals(zones: Vec<(u32, usize, f64)>, scale: f64) -> Result<Self> {
        ensure!(scale.is_finite() && scale > 0.0, "[plan::summary] scale must be positive, got {scale}");
        ensure!(!zones.is_empty(), "[plan::summary] plan has no zones");

        let zones = zones.into_iter()
            .map(|(zone, beats, total)| ZoneSummary { zone, beats, workload: total / scale })
            .collect::<Vec<_>>();

        let count = zones.len() as f64;
        let mean = zones.iter().map(|z| z.workload).sum::<f64>() / count;
        let balance_objective = zones.iter().map(|z| (z.workload - mean).powi(2)).sum::<f64>();
        let variance = if zones.len() > 1 { balance_objective / (count - 1.0) } else { 0.0 };
        let min = zones.iter().map(|z| z.workload).fold(f64::INFINITY, f64::min);
        let max = zones.iter().map(|z| z.workload).fold(f64::NEG_INFINITY, f64::max);

        Ok(Self { zones, mean, variance, population_variance: balance_objective / count, min, max, balance_objective })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>6} {:>6} {:>16}", "zone", "beats", "workload")?;
        for zone in &self.zones {
            writeln!(f, "{:>6} {:>6} {:>16.6}", zone.zone, zone.beats, zone.workload)?;
        }
        writeln!(f, "mean     = {:.6}", self.mean)?;
        writeln!(f, "variance = {:.6} (population {:.6})", self.variance, self.population_variance)?;
        writeln!(f, "range    = [{:.6}, {:.6}]", self.min, self.max)?;
        write!(f, "balance  = {:.6}", self.balance_objective)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use super::*;
    use crate::map::BeatMap;

    fn plan() -> ZonePlan {
        let map = BeatMap::new(
            vec![("A".into(), 3600.0), ("B".into(), 7200.0), ("C".into(), 1800.0), ("D".into(), 5400.0)],
            &[("A", "B"), ("B", "C"), ("C", "D")],
        ).unwrap();
        let zones = HashMap::from([("A".to_string(), 0), ("B".to_string(), 0), ("C".to_string(), 1), ("D".to_string(), 2)]);
        ZonePlan::from_assignments(Arc::new(map), 3, &zones).unwrap()
    }

    #[test]
    fn statistics_match_hand_computation() {
        // Zone totals in hours: 3.0, 0.5, 1.5; mean 5/3.
        let summary = Summary::from_plan(&plan(), 3600.0).unwrap();

        assert_eq!(summary.zones, vec![
            ZoneSummary { zone: 0, beats: 2, workload: 3.0 },
            ZoneSummary { zone: 1, beats: 1, workload: 0.5 },
            ZoneSummary { zone: 2, beats: 1, workload: 1.5 },
        ]);
        let mean: f64 = 5.0 / 3.0;
        let squares = (3.0 - mean).powi(2) + (0.5 - mean).powi(2) + (1.5 - mean).powi(2);
        assert!((summary.mean - mean).abs() < 1e-12);
        assert!((summary.balance_objective - squares).abs() < 1e-12);
        assert!((summary.variance - squares / 2.0).abs() < 1e-12);
        assert!((summary.population_variance - squares / 3.0).abs() < 1e-12);
        assert_eq!((summary.min, summary.max), (0.5, 3.0));
    }

    #[test]
    fn single_zone_has_zero_sample_variance() {
        let map = BeatMap::new::<&str>(vec![("A".into(), 2.0)], &[]).unwrap();
        let plan = ZonePlan::from_assignments(Arc::new(map), 1, &HashMap::from([("A".to_string(), 0)])).unwrap();
        let summary = Summary::from_plan(&plan, 1.0).unwrap();
        assert_eq!((summary.variance, summary.population_variance), (0.0, 0.0));
    }

    #[test]
    fn result_table_gives_same_summary() {
        let plan = plan();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opt_result.csv");
        plan.write_to_csv(&path).unwrap();

        let from_table = Summary::from_result_table(&path, 3600.0).unwrap();
        let from_plan = Summary::from_plan(&plan, 3600.0).unwrap();
        assert_eq!(from_table.zones, from_plan.zones);
        assert!((from_table.variance - from_plan.variance).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(Summary::from_plan(&plan(), 0.0).is_err());
    }

    #[test]
    fn serializes_to_json() {
        let summary = Summary::from_plan(&plan(), 3600.0).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["zones"][1]["beats"], 1);
        assert_eq!(json["max"], 3.0);
    }
}
