use std::sync::Arc;

use anyhow::Result;
use rezone::{BeatMap, SymmetryPolicy, ZonePlan};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ValidateArgs) -> Result<()> {
    let symmetry = if args.strict_symmetry { SymmetryPolicy::Strict } else { SymmetryPolicy::Symmetrize };
    let map = Arc::new(BeatMap::read_from_csv(&args.adjacency, &args.workload, symmetry)?);

    tracing::info!("[validate] reading plan from {}", args.result.display());
    let plan = ZonePlan::read_from_csv(map, args.zones, &args.result)?;
    plan.ensure_valid()?;

    println!("{}: valid plan with {} zones over {} beats", args.result.display(), plan.num_zones(), plan.map().len());
    Ok(())
}
