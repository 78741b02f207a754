use std::{
    io,
    sync::{Arc, Mutex},
};

use rezone::{
    BeatMap, MilpSolver, Program, SolveError, Solution, Solver, Summary, SymmetryPolicy, ZoneConfig, ZoneError, ZonePlan,
};

const PATH_ADJACENCY: &str = ",A,B,C,D\nA,0,1,0,0\nB,1,0,1,0\nC,0,1,0,1\nD,0,0,1,0\n";
const PATH_WORKLOAD: &str = "A,10\nB,10\nC,10\nD,10\n";

fn path_map(workloads: &[f64]) -> Arc<BeatMap> {
    let beats = workloads.iter().enumerate()
        .map(|(i, &u)| (((b'A' + i as u8) as char).to_string(), u))
        .collect::<Vec<_>>();
    let edges = beats.windows(2)
        .map(|pair| (pair[0].0.clone(), pair[1].0.clone()))
        .collect::<Vec<_>>();
    Arc::new(BeatMap::new(beats, &edges).unwrap())
}

/// Reports infeasibility without looking at the program.
struct AlwaysInfeasible;

impl Solver for AlwaysInfeasible {
    fn solve(&self, _program: &Program) -> Result<Solution, SolveError> { Err(SolveError::Infeasible) }
}

/// Collects formatted log lines in memory.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String { String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned() }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

/// Run `f` with every log line at info level and above captured.
fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.text())
}

/// Fails the test if the pipeline reaches the solver.
struct MustNotSolve;

impl Solver for MustNotSolve {
    fn solve(&self, _program: &Program) -> Result<Solution, SolveError> { panic!("solver must not be called") }
}

#[test]
fn path_of_four_splits_into_equal_halves() {
    let map = Arc::new(BeatMap::read_from_csv_str(PATH_ADJACENCY, PATH_WORKLOAD, SymmetryPolicy::Strict).unwrap());
    let plan = ZonePlan::solve(map, &ZoneConfig::new(2), &MilpSolver::default()).unwrap();

    assert!(plan.objective().unwrap().abs() < 1e-6);
    assert_eq!(plan.zone_of("A"), plan.zone_of("B"));
    assert_eq!(plan.zone_of("C"), plan.zone_of("D"));
    assert_ne!(plan.zone_of("A"), plan.zone_of("C"));
    assert_eq!(plan.zone_totals(), vec![20.0, 20.0]);
    assert!(plan.ensure_valid().is_ok());

    let csv = plan.to_csv().unwrap();
    let lines = csv.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], ",beat,zone,workload");
    assert!(lines[1].starts_with("1,A,") && lines[1].ends_with(",10.000000"));
    assert!(lines[4].starts_with("4,D,"));
}

#[test]
fn one_zone_per_beat_pays_the_full_spread() {
    let plan = ZonePlan::solve(path_map(&[1.0, 2.0, 6.0]), &ZoneConfig::new(3), &MilpSolver::default()).unwrap();

    // Mean 3: (1 - 3)^2 + (2 - 3)^2 + (6 - 3)^2.
    assert!((plan.objective().unwrap() - 14.0).abs() < 1e-6);
    let mut zones = plan.assignments().to_vec();
    zones.sort_unstable();
    assert_eq!(zones, vec![0, 1, 2]);
}

#[test]
fn single_zone_takes_every_beat() {
    let plan = ZonePlan::solve(path_map(&[4.0, 5.0, 6.0]), &ZoneConfig::new(1), &MilpSolver::default()).unwrap();

    assert_eq!(plan.assignments(), &[0, 0, 0]);
    assert!(plan.objective().unwrap().abs() < 1e-6);
    assert_eq!(plan.sinks().len(), 1);
    assert!(plan.sinks()[0].is_some());
}

#[test]
fn balances_uneven_workloads_along_a_path() {
    // Best contiguous split of 5 | 1 1 1 1 1 is {A} + {B..F}: zone totals 5 and 5.
    let plan = ZonePlan::solve(path_map(&[5.0, 1.0, 1.0, 1.0, 1.0, 1.0]), &ZoneConfig::new(2), &MilpSolver::default()).unwrap();

    assert!(plan.objective().unwrap().abs() < 1e-6);
    let a = plan.zone_of("A").unwrap();
    assert!(["B", "C", "D", "E", "F"].iter().all(|beat| plan.zone_of(beat) != Some(a)));
}

#[test]
fn disconnected_beats_cannot_share_a_zone() {
    let map = Arc::new(BeatMap::new::<&str>(vec![("A".into(), 1.0), ("B".into(), 1.0)], &[]).unwrap());
    let err = ZonePlan::solve(map, &ZoneConfig::new(1), &MilpSolver::default()).unwrap_err();
    assert!(matches!(err.downcast_ref::<SolveError>(), Some(SolveError::Infeasible)), "{err:?}");
}

#[test]
fn infeasible_solve_writes_no_result() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("opt_result.csv");

    let result = ZonePlan::solve(path_map(&[1.0, 1.0]), &ZoneConfig::new(2), &AlwaysInfeasible)
        .and_then(|plan| plan.write_to_csv(&out));

    let err = result.unwrap_err();
    assert!(matches!(err.downcast_ref::<SolveError>(), Some(SolveError::Infeasible)));
    assert!(!out.exists());
}

#[test]
fn infeasible_status_is_logged() {
    let (result, logs) = with_captured_logs(|| ZonePlan::solve(path_map(&[1.0, 1.0]), &ZoneConfig::new(2), &AlwaysInfeasible));

    assert!(result.is_err());
    assert!(logs.contains("No solution found, optimization status = infeasible"), "{logs}");
    assert!(!logs.contains("Solution found, objective"), "{logs}");
}

#[test]
fn solved_plan_logs_objective_and_every_beat() {
    let (result, logs) = with_captured_logs(|| ZonePlan::solve(path_map(&[3.0, 3.0]), &ZoneConfig::new(2), &MilpSolver::default()));

    let plan = result.unwrap();
    assert!(logs.contains("Solution found, objective = "), "{logs}");
    for beat in ["A", "B"] {
        let line = format!("beat {beat} in zone {}", plan.zone_of(beat).unwrap());
        assert!(logs.contains(&line), "missing {line:?} in {logs}");
    }
}

#[test]
fn degenerate_zone_counts_fail_before_solving() {
    for zones in [0, 4] {
        let err = ZonePlan::solve(path_map(&[1.0, 1.0, 1.0]), &ZoneConfig::new(zones), &MustNotSolve).unwrap_err();
        assert!(matches!(err.downcast_ref::<ZoneError>(), Some(ZoneError::InvalidZoneCount { nodes: 3, .. })));
    }
}

#[test]
fn bad_threshold_fails_before_solving() {
    let config = ZoneConfig { assignment_threshold: 1.0, ..ZoneConfig::new(1) };
    assert!(ZonePlan::solve(path_map(&[1.0]), &config, &MustNotSolve).is_err());
}

#[test]
fn missing_workload_stops_the_run() {
    let err = BeatMap::read_from_csv_str(PATH_ADJACENCY, "A,10\nB,10\nC,10\n", SymmetryPolicy::Symmetrize).unwrap_err();
    assert!(matches!(err.downcast_ref::<ZoneError>(), Some(ZoneError::MissingData(_))));
}

#[test]
fn files_in_files_out() {
    let dir = tempfile::tempdir().unwrap();
    let adjacency = dir.path().join("beats_graph.csv");
    let workload = dir.path().join("workload.txt");
    let result = dir.path().join("opt_result.csv");
    std::fs::write(&adjacency, PATH_ADJACENCY).unwrap();
    std::fs::write(&workload, "A,3600\nB,7200\nC,3600\nD,7200\n").unwrap();

    let map = Arc::new(BeatMap::read_from_csv(&adjacency, &workload, SymmetryPolicy::Strict).unwrap());
    let plan = ZonePlan::solve(map.clone(), &ZoneConfig::new(2), &MilpSolver::default()).unwrap();
    plan.write_to_csv(&result).unwrap();

    let read = ZonePlan::read_from_csv(map, 2, &result).unwrap();
    assert_eq!(read.assignments(), plan.assignments());
    assert!(read.ensure_valid().is_ok());

    // Totals 3 h and 3 h for {A, B} + {C, D}.
    let summary = Summary::from_result_table(&result, 3600.0).unwrap();
    assert_eq!(summary.zones.len(), 2);
    assert!(summary.zones.iter().all(|zone| (zone.workload - 3.0).abs() < 1e-9));
    assert!(summary.variance.abs() < 1e-9);
}
