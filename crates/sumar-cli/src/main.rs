//! Sumador CLI: coverage aggregation and reporting for multi-module
//! projects
//!
//! ## Usage
//!
//! ```bash
//! sumador report                      # per-module + aggregate reports
//! sumador report --format csv         # tabular output only
//! sumador merge --input target/it.exec --output all.exec
//! ```

use clap::Parser;
use std::process::ExitCode;
use sumador::{handlers, Cli, CliConfig, CliResult, Commands, Verbosity};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match cli.command {
        Commands::Report(args) => handlers::report::execute_report(&config, &args),
        Commands::Merge(args) => handlers::merge::execute_merge(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };
    CliConfig::new().with_verbosity(verbosity)
}

fn init_tracing(verbosity: Verbosity) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
