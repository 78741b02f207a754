mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{solve, summarize, validate};

/// Send library and CLI logs to stderr, at info level unless raised with `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Solve(args) => solve::run(&cli, args),
        Commands::Validate(args) => validate::run(&cli, args),
        Commands::Summarize(args) => summarize::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
