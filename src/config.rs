use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// What to do when the adjacency input lists `a -> b` but not `b -> a`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryPolicy {
    /// Add the missing reverse arc and log a warning.
    #[default]
    Symmetrize,
    /// Reject the input.
    Strict,
}

/// MILP engine used by [`crate::MilpSolver`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Pure-Rust branch-and-bound (`good_lp` + `microlp`).
    #[default]
    MicroLp,
    /// HiGHS (requires the `highs` feature).
    Highs,
}

/// Run configuration for building and solving a zone model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Number of zones `m`.
    pub num_zones: usize,
    /// Binary variables above this value count as set.
    pub assignment_threshold: f64,
    /// Handling of one-directional adjacency entries.
    pub symmetry: SymmetryPolicy,
    /// Engine to hand the model to.
    pub backend: Backend,
    /// Time limit in seconds, passed to the engine unchanged.
    pub time_limit: Option<f64>,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            num_zones: 6,
            assignment_threshold: 0.5,
            symmetry: SymmetryPolicy::default(),
            backend: Backend::default(),
            time_limit: None,
        }
    }
}

impl ZoneConfig {
    /// Create a configuration for `num_zones` zones with default settings.
    pub fn new(num_zones: usize) -> Self {
        Self { num_zones, ..Self::default() }
    }

    /// Read a configuration from a JSON file. Missing fields take their defaults.
    pub fn read_from_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("[config] Failed to parse config file: {}", path.display()))?;
        config.check()?;
        Ok(config)
    }

    /// Check field ranges that do not depend on the input data.
    pub fn check(&self) -> Result<()> {
        ensure!(
            self.assignment_threshold > 0.0 && self.assignment_threshold < 1.0,
            "[config] assignment_threshold must be in (0, 1), got {}", self.assignment_threshold
        );
        if let Some(limit) = self.time_limit {
            ensure!(limit.is_finite() && limit > 0.0, "[config] time_limit must be positive, got {limit}");
        }
        Ok(())
    }
}
