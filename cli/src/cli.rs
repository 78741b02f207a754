use std::path::PathBuf;

/// Zoning CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "rezone", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Solve for contiguous, workload-balanced zones and write the result table
    Solve(SolveArgs),

    /// Check a result table for partition, contiguity, and size violations
    Validate(ValidateArgs),

    /// Print per-zone workload totals and balance statistics of a result table
    Summarize(SummarizeArgs),
}

#[derive(clap::Args, Debug)]
pub struct SolveArgs {
    /// Adjacency matrix CSV (header row of beat ids, one 0/1 row per beat)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub adjacency: PathBuf,

    /// Workload listing, one `<beat>,<workload>` record per line
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub workload: PathBuf,

    /// Number of zones, defaults to the config file value or 6
    #[arg(short = 'z', long)]
    pub zones: Option<usize>,

    /// Output result table, defaults to "./opt_result.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Solver time limit in seconds
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// Reject adjacency matrices that are not symmetric
    #[arg(long)]
    pub strict_symmetry: bool,

    /// Value above which a binary variable counts as set
    #[arg(long)]
    pub threshold: Option<f64>,

    /// JSON run configuration; flags override its fields
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Solve with HiGHS (requires the `highs` feature)
    #[arg(long)]
    pub highs: bool,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Adjacency matrix CSV
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub adjacency: PathBuf,

    /// Workload listing
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub workload: PathBuf,

    /// Result table to check
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub result: PathBuf,

    /// Number of zones the plan was solved for
    #[arg(short = 'z', long)]
    pub zones: u32,

    /// Reject adjacency matrices that are not symmetric
    #[arg(long)]
    pub strict_symmetry: bool,
}

#[derive(clap::Args, Debug)]
pub struct SummarizeArgs {
    /// Result table to summarize
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub result: PathBuf,

    /// Divide workloads by this factor, e.g. 3600 * days to report hours per day
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
