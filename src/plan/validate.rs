use std::fmt;

use anyhow::Result;

use crate::{error::ZoneError, plan::ZonePlan};

/// A structural property a zoning plan fails to meet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// A beat is assigned to a zone outside `[0, m)`.
    ZoneOutOfRange { beat: String, zone: u32 },
    EmptyZone { zone: u32 },
    /// The zone's beats do not form a connected subgraph.
    NotContiguous { zone: u32 },
    /// The recorded sink of a zone lies in a different zone.
    SinkOutsideZone { zone: u32, beat: String },
    /// A solver-built plan has no sink for the zone.
    MissingSink { zone: u32 },
    /// More than `q = n - m + 1` beats.
    ZoneTooLarge { zone: u32, size: usize, max: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ZoneOutOfRange { beat, zone } => write!(f, "beat '{beat}' is assigned to zone {zone}, which does not exist"),
            Violation::EmptyZone { zone } => write!(f, "zone {zone} is empty"),
            Violation::NotContiguous { zone } => write!(f, "zone {zone} is not contiguous"),
            Violation::SinkOutsideZone { zone, beat } => write!(f, "sink '{beat}' of zone {zone} is not in that zone"),
            Violation::MissingSink { zone } => write!(f, "zone {zone} has no sink"),
            Violation::ZoneTooLarge { zone, size, max } => write!(f, "zone {zone} has {size} beats, more than the limit of {max}"),
        }
    }
}

impl ZonePlan {
    /// Check the plan against the properties every feasible zoning satisfies.
    /// Returns every violation found, in zone order after the range check.
    pub fn validate(&self) -> Vec<Violation> {
        let map = self.map();
        let graph = map.graph();
        let m = self.num_zones();
        let mut violations = Vec::new();

        for (i, &zone) in self.assignments.iter().enumerate() {
            if zone >= m {
                violations.push(Violation::ZoneOutOfRange { beat: map.beat(i).to_string(), zone });
            }
        }

        let max = (map.len() + 1).saturating_sub(m as usize);
        for (zone, members) in self.zone_members().iter().enumerate() {
            let zone = zone as u32;
            if members.is_empty() {
                violations.push(Violation::EmptyZone { zone });
                continue;
            }

            let sink = self.sinks.get(zone as usize).copied().flatten();
            if sink.is_none() && self.objective().is_some() {
                violations.push(Violation::MissingSink { zone });
            }
            if let Some(sink) = sink.filter(|&s| self.assignments[s] != zone) {
                violations.push(Violation::SinkOutsideZone { zone, beat: map.beat(sink).to_string() });
            }

            let connected = match sink.filter(|&s| self.assignments[s] == zone) {
                Some(root) => graph.is_connected_from(root, members),
                None => graph.is_connected_subset(members),
            };
            if !connected {
                violations.push(Violation::NotContiguous { zone });
            }

            if members.len() > max {
                violations.push(Violation::ZoneTooLarge { zone, size: members.len(), max });
            }
        }

        violations
    }

    /// Fail with [`ZoneError::InvalidPlan`] listing every violation, if any.
    pub fn ensure_valid(&self) -> Result<()> {
        let violations = self.validate();
        if violations.is_empty() { return Ok(()) }

        for violation in &violations {
            tracing::warn!("[plan::validate] {violation}");
        }
        Err(ZoneError::InvalidPlan(violations.iter().map(Violation::to_string).collect()).into())
    }
}
