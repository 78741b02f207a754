use std::sync::Arc;

use anyhow::Result;
use rezone::{Backend, BeatMap, MilpSolver, SymmetryPolicy, ZoneConfig, ZonePlan};

/// Merge the config file (if any) with the flags, which take precedence.
fn config_from_args(args: &crate::cli::SolveArgs) -> Result<ZoneConfig> {
    let mut config = match &args.config {
        Some(path) => ZoneConfig::read_from_json(path)?,
        None => ZoneConfig::default(),
    };
    if let Some(zones) = args.zones { config.num_zones = zones }
    if let Some(threshold) = args.threshold { config.assignment_threshold = threshold }
    if args.time_limit.is_some() { config.time_limit = args.time_limit }
    if args.strict_symmetry { config.symmetry = SymmetryPolicy::Strict }
    if args.highs { config.backend = Backend::Highs }
    config.check()?;
    Ok(config)
}

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::SolveArgs) -> Result<()> {
    let config = config_from_args(args)?;
    let out_path = &args.output.clone().unwrap_or("./opt_result.csv".into());

    tracing::info!("[solve] loading beats from {} and {}", args.adjacency.display(), args.workload.display());
    let map = Arc::new(BeatMap::read_from_csv(&args.adjacency, &args.workload, config.symmetry)?);
    tracing::info!("[solve] {} beats, {} adjacencies, {} zones", map.len(), map.adjacency_count(), config.num_zones);

    let solver = MilpSolver::from_config(&config);
    let plan = ZonePlan::solve(map, &config, &solver)?;
    plan.ensure_valid()?;

    tracing::info!("[solve] writing plan to {}", out_path.display());
    plan.write_to_csv(out_path)?;

    Ok(())
}
