use std::{collections::HashMap, sync::Arc};

use anyhow::Result;

use crate::{
    config::ZoneConfig,
    error::ZoneError,
    map::BeatMap,
    model::{Var, ZoneModel},
    solver::{SolveError, Solution, Solver},
};

/// A zoning plan, assigning every beat of a map to one of `num_zones` zones.
#[derive(Clone, Debug)]
pub struct ZonePlan {
    map: Arc<BeatMap>,
    num_zones: u32,
    pub(super) assignments: Vec<u32>,   // zone per beat, in map order
    pub(super) sinks: Vec<Option<usize>>, // sink beat per zone, if known
    pub(super) objective: Option<f64>,
}

impl ZonePlan {
    /// Create a plan from a beat-to-zone mapping. Every beat of the map must be listed.
    pub fn from_assignments(map: impl Into<Arc<BeatMap>>, num_zones: u32, assignments: &HashMap<String, u32>) -> Result<Self> {
        let map: Arc<BeatMap> = map.into();

        if let Some(unknown) = assignments.keys().find(|beat| map.index_of(beat).is_none()) {
            return Err(ZoneError::MissingData(format!("plan assigns unknown beat '{unknown}'")).into());
        }
        let assignments = map.beats().iter()
            .map(|beat| assignments.get(beat).copied()
                .ok_or_else(|| ZoneError::MissingData(format!("plan has no zone for beat '{beat}'"))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { map, num_zones, assignments, sinks: vec![None; num_zones as usize], objective: None })
    }

    /// Read the plan out of a solved zoning model.
    ///
    /// A binary counts as set when its value exceeds `threshold`. A beat with no
    /// zone, or with more than one, means the solution is unusable.
    pub fn extract(map: impl Into<Arc<BeatMap>>, model: &ZoneModel, solution: &Solution, threshold: f64) -> Result<Self> {
        let map: Arc<BeatMap> = map.into();
        let (n, m) = (model.num_nodes(), model.num_zones());
        assert!(map.len() == n, "model must be built from the same map");
        assert!(solution.values.len() == model.program().num_vars(), "solution must cover every program variable");

        let is_set = |var: Var| solution.values[var.index()] > threshold;

        let mut assignments = Vec::with_capacity(n);
        for i in 0..n {
            let zones = (0..m).filter(|&k| is_set(model.assign_var(i, k))).collect::<Vec<_>>();
            match zones.as_slice() {
                [k] => assignments.push(*k as u32),
                [] => return Err(SolveError::Failed(format!("beat '{}' is not assigned to any zone", map.beat(i))).into()),
                _ => return Err(SolveError::Failed(format!("beat '{}' is assigned to zones {zones:?}", map.beat(i))).into()),
            }
        }

        let sinks = (0..m)
            .map(|k| (0..n).find(|&i| is_set(model.sink_var(i, k))))
            .collect();

        Ok(Self { map, num_zones: m as u32, assignments, sinks, objective: Some(solution.objective) })
    }

    /// Build the zoning model for `map`, solve it, and read back the plan.
    ///
    /// Fails with [`SolveError`] when the solver finds no solution; nothing is
    /// written in that case.
    pub fn solve(map: impl Into<Arc<BeatMap>>, config: &ZoneConfig, solver: &impl Solver) -> Result<Self> {
        let map: Arc<BeatMap> = map.into();
        config.check()?;
        if !map.is_connected() {
            tracing::warn!("[plan::solve] the beat graph is disconnected; the model may be infeasible");
        }

        let model = ZoneModel::build(&map, config.num_zones)?;
        let solution = match solver.solve(model.program()) {
            Ok(solution) => solution,
            Err(err) => {
                tracing::error!("No solution found, optimization status = {}", err.status());
                return Err(err.into());
            }
        };
        tracing::info!("Solution found, objective = {}", solution.objective);

        let plan = Self::extract(map, &model, &solution, config.assignment_threshold)?;
        for (i, &zone) in plan.assignments.iter().enumerate() {
            tracing::info!("beat {} in zone {}", plan.map.beat(i), zone);
        }
        Ok(plan)
    }

    /// Get a reference to the map.
    #[inline] pub fn map(&self) -> &BeatMap { &self.map }

    /// Number of zones `m`.
    #[inline] pub fn num_zones(&self) -> u32 { self.num_zones }

    /// Zone of every beat, in map order.
    #[inline] pub fn assignments(&self) -> &[u32] { &self.assignments }

    /// Zone of a beat by id.
    pub fn zone_of(&self, beat: &str) -> Option<u32> {
        self.map.index_of(beat).map(|i| self.assignments[i])
    }

    /// Sink beat index per zone, when the plan came from a solver.
    #[inline] pub fn sinks(&self) -> &[Option<usize>] { &self.sinks }

    /// Objective reported by the solver, if any.
    #[inline] pub fn objective(&self) -> Option<f64> { self.objective }

    /// Beat indices of each zone, in map order. Out-of-range zones are ignored.
    pub fn zone_members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![vec![]; self.num_zones as usize];
        for (i, &zone) in self.assignments.iter().enumerate() {
            if let Some(zone) = members.get_mut(zone as usize) { zone.push(i) }
        }
        members
    }

    /// Total workload of each zone.
    pub fn zone_totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.num_zones as usize];
        for (i, &zone) in self.assignments.iter().enumerate() {
            if let Some(total) = totals.get_mut(zone as usize) { *total += self.map.workload(i) }
        }
        totals
    }

    /// Squared deviation of the zone totals from their mean, the quantity the model minimizes.
    pub fn balance_objective(&self) -> f64 {
        let mean = self.map.total_workload() / self.num_zones as f64;
        self.zone_totals().iter().map(|total| (total - mean).powi(2)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_map() -> Arc<BeatMap> {
        Arc::new(BeatMap::new(
            vec![("A".into(), 10.0), ("B".into(), 10.0), ("C".into(), 10.0), ("D".into(), 10.0)],
            &[("A", "B"), ("B", "C"), ("C", "D")],
        ).unwrap())
    }

    /// Solution vector with the given zones and sinks set; flows left at zero.
    fn solution_for(model: &ZoneModel, zones: &[(usize, usize)], sinks: &[(usize, usize)], value: f64) -> Solution {
        let mut values = vec![0.0; model.program().num_vars()];
        for &(i, k) in zones { values[model.assign_var(i, k).index()] = value }
        for &(i, k) in sinks { values[model.sink_var(i, k).index()] = value }
        Solution { values, objective: 0.0 }
    }

    #[test]
    fn from_assignments_requires_every_beat() {
        let mut zones = HashMap::from([("A".to_string(), 0), ("B".to_string(), 0), ("C".to_string(), 1)]);
        let err = ZonePlan::from_assignments(path_map(), 2, &zones).unwrap_err();
        assert!(matches!(err.downcast_ref::<ZoneError>(), Some(ZoneError::MissingData(_))));

        zones.insert("D".into(), 1);
        let plan = ZonePlan::from_assignments(path_map(), 2, &zones).unwrap();
        assert_eq!(plan.assignments(), &[0, 0, 1, 1]);
        assert_eq!(plan.zone_of("C"), Some(1));
        assert_eq!(plan.zone_totals(), vec![20.0, 20.0]);
        assert_eq!(plan.balance_objective(), 0.0);

        zones.insert("Z".into(), 1);
        assert!(ZonePlan::from_assignments(path_map(), 2, &zones).is_err());
    }

    #[test]
    fn extract_uses_threshold_not_equality() {
        let map = path_map();
        let model = ZoneModel::build(&map, 2).unwrap();
        let solution = solution_for(&model, &[(0, 0), (1, 0), (2, 1), (3, 1)], &[(0, 0), (3, 1)], 0.9999997);

        let plan = ZonePlan::extract(map, &model, &solution, 0.5).unwrap();
        assert_eq!(plan.assignments(), &[0, 0, 1, 1]);
        assert_eq!(plan.sinks(), &[Some(0), Some(3)]);
        assert_eq!(plan.objective(), Some(0.0));
    }

    #[test]
    fn extract_rejects_unassigned_and_double_assigned_beats() {
        let map = path_map();
        let model = ZoneModel::build(&map, 2).unwrap();

        let missing = solution_for(&model, &[(0, 0), (1, 0), (2, 1)], &[], 1.0);
        let err = ZonePlan::extract(map.clone(), &model, &missing, 0.5).unwrap_err();
        assert!(matches!(err.downcast_ref::<SolveError>(), Some(SolveError::Failed(_))));
        assert!(err.to_string().contains("'D'"));

        let double = solution_for(&model, &[(0, 0), (0, 1), (1, 0), (2, 1), (3, 1)], &[], 1.0);
        let err = ZonePlan::extract(map, &model, &double, 0.5).unwrap_err();
        assert!(matches!(err.downcast_ref::<SolveError>(), Some(SolveError::Failed(_))));
    }

    #[test]
    fn zone_members_follow_map_order() {
        let zones = HashMap::from([("A".to_string(), 1), ("B".to_string(), 0), ("C".to_string(), 1), ("D".to_string(), 0)]);
        let plan = ZonePlan::from_assignments(path_map(), 2, &zones).unwrap();
        assert_eq!(plan.zone_members(), vec![vec![1, 3], vec![0, 2]]);
    }
}
