//! Contiguous, workload-balanced zoning as a mixed-integer quadratic program.
//!
//! Contiguity is enforced with single-commodity flow: every zone has one sink
//! beat, every other member must push one net unit of flow toward it, and
//! flow may only travel along adjacencies inside a single zone. A zone whose
//! members cannot all reach its sink cannot satisfy the flow balance.

use anyhow::Result;

use crate::{
    error::ZoneError,
    map::BeatMap,
    model::{LinearExpr, Program, QuadraticExpr, Sense, Var},
};

/// The zoning program together with the handles needed to read a solution back.
#[derive(Clone, Debug)]
pub struct ZoneModel {
    program: Program,
    num_nodes: usize,
    num_zones: usize,
    max_zone_size: usize,
    assign: Vec<Var>, // x[i,k] at i * m + k
    sink: Vec<Var>,   // w[i,k] at i * m + k
    flow: Vec<Var>,   // y[i,j,k] at slot(i -> j) * m + k
}

impl ZoneModel {
    /// Build the zoning program for `map` with `num_zones` zones.
    ///
    /// Fails with [`ZoneError::InvalidZoneCount`] unless `1 <= num_zones <= map.len()`.
    pub fn build(map: &BeatMap, num_zones: usize) -> Result<Self> {
        let n = map.len();
        let m = num_zones;
        if m == 0 || m > n {
            return Err(ZoneError::InvalidZoneCount { zones: m, nodes: n }.into());
        }

        let graph = map.graph();
        let q = n - m + 1;
        let cap = (q - 1) as f64;

        let mut program = Program::new();

        // x[i,k]: beat i belongs to zone k.
        let assign = (0..n)
            .flat_map(|i| (0..m).map(move |k| (i, k)))
            .map(|(i, k)| program.add_binary(format!("x[{},{k}]", map.beat(i))))
            .collect::<Vec<_>>();

        // w[i,k]: beat i is the sink of zone k.
        let sink = (0..n)
            .flat_map(|i| (0..m).map(move |k| (i, k)))
            .map(|(i, k)| program.add_binary(format!("w[{},{k}]", map.beat(i))))
            .collect::<Vec<_>>();

        // y[i,j,k]: flow along the arc i -> j inside zone k; adjacent pairs only.
        let mut flow = Vec::with_capacity(graph.edge_count() * m);
        for (i, j, slot) in graph.arcs() {
            debug_assert_eq!(flow.len(), slot * m);
            for k in 0..m {
                flow.push(program.add_continuous(format!("y[{},{},{k}]", map.beat(i), map.beat(j)), 0.0, f64::INFINITY));
            }
        }

        let x = |i: usize, k: usize| assign[i * m + k];
        let w = |i: usize, k: usize| sink[i * m + k];
        let y = |slot: usize, k: usize| flow[slot * m + k];
        let reverse = graph.reverse_slots();
        let outflow = |i: usize, k: usize| LinearExpr::sum(graph.range(i).map(|slot| y(slot, k)));
        let inflow = |i: usize, k: usize| LinearExpr::sum(graph.range(i).map(|slot| y(reverse[slot], k)));

        // b: each beat lies in exactly one zone.
        for i in 0..n {
            program.add_constraint(format!("b[{}]", map.beat(i)), LinearExpr::sum((0..m).map(|k| x(i, k))), Sense::Equal, 1.0);
        }

        // c: net outflow covers membership unless the beat is the sink.
        for i in 0..n {
            for k in 0..m {
                let mut expr = outflow(i, k);
                for &(v, _) in inflow(i, k).terms() { expr.add_term(v, -1.0); }
                expr.add_term(x(i, k), -1.0).add_term(w(i, k), q as f64);
                program.add_constraint(format!("c[{},{k}]", map.beat(i)), expr, Sense::GreaterEq, 0.0);
            }
        }

        // d: m sinks in total.
        program.add_constraint("d", LinearExpr::sum(sink.iter().copied()), Sense::Equal, m as f64);

        // e: one sink per zone.
        for k in 0..m {
            program.add_constraint(format!("e[{k}]"), LinearExpr::sum((0..n).map(|i| w(i, k))), Sense::Equal, 1.0);
        }

        // f: no inflow from outside the zone, at most q - 1 inside it.
        for i in 0..n {
            for k in 0..m {
                let expr = inflow(i, k).with_term(x(i, k), -cap);
                program.add_constraint(format!("f[{},{k}]", map.beat(i)), expr, Sense::LessEq, 0.0);
            }
        }

        // g: a sink belongs to its own zone.
        for i in 0..n {
            for k in 0..m {
                let expr = LinearExpr::new().with_term(w(i, k), 1.0).with_term(x(i, k), -1.0);
                program.add_constraint(format!("g[{},{k}]", map.beat(i)), expr, Sense::LessEq, 0.0);
            }
        }

        // h, i: flow on an edge only when both ends share the zone. One pair of rows per undirected edge.
        for (i, j, ij) in graph.undirected_edges() {
            let ji = reverse[ij];
            for k in 0..m {
                let both = LinearExpr::new().with_term(y(ij, k), 1.0).with_term(y(ji, k), 1.0);
                let (a, b) = (map.beat(i), map.beat(j));
                program.add_constraint(format!("h[{a},{b},{k}]"), both.clone().with_term(x(i, k), -cap), Sense::LessEq, 0.0);
                program.add_constraint(format!("i[{a},{b},{k}]"), both.with_term(x(j, k), -cap), Sense::LessEq, 0.0);
            }
        }

        // j: non-negative flow, kept as explicit rows alongside the bounds.
        for (i, j, slot) in graph.arcs() {
            for k in 0..m {
                program.add_constraint(format!("j[{},{},{k}]", map.beat(i), map.beat(j)), LinearExpr::sum([y(slot, k)]), Sense::GreaterEq, 0.0);
            }
        }

        // Objective: squared deviation of every zone's workload from the mean.
        let mean = map.total_workload() / m as f64;
        let mut objective = QuadraticExpr::new();
        for k in 0..m {
            let mut load = LinearExpr::new().with_constant(-mean);
            for i in 0..n { load.add_term(x(i, k), map.workload(i)); }
            objective.add_square(&load);
        }
        program.set_objective(objective);

        tracing::info!(
            "[model] built zoning program: {} beats, {} zones, q = {}, {} variables, {} constraints",
            n, m, q, program.num_vars(), program.constraints().len(),
        );

        Ok(Self { program, num_nodes: n, num_zones: m, max_zone_size: q, assign, sink, flow })
    }

    /// The program to hand to a solver.
    #[inline] pub fn program(&self) -> &Program { &self.program }

    /// Number of beats `n`.
    #[inline] pub fn num_nodes(&self) -> usize { self.num_nodes }

    /// Number of zones `m`.
    #[inline] pub fn num_zones(&self) -> usize { self.num_zones }

    /// Largest number of beats a zone may hold, `q = n - m + 1`.
    #[inline] pub fn max_zone_size(&self) -> usize { self.max_zone_size }

    /// Assignment variable `x[node, zone]`.
    #[inline] pub fn assign_var(&self, node: usize, zone: usize) -> Var { self.assign[node * self.num_zones + zone] }

    /// Sink variable `w[node, zone]`.
    #[inline] pub fn sink_var(&self, node: usize, zone: usize) -> Var { self.sink[node * self.num_zones + zone] }

    /// Number of flow variables (arcs times zones).
    #[inline] pub fn num_flow_vars(&self) -> usize { self.flow.len() }
}
