//! wingman CLI - run, batch and validate pilot AI scenarios.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// wingman - scripted pilots in a 2D space combat simulation
#[derive(Parser, Debug)]
#[command(name = "wingman")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario once and print a report
    Run {
        /// Scenario JSON file
        #[arg(required = true)]
        scenario: std::path::PathBuf,

        /// Random seed (default: the scenario's)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Ticks to run (default: the scenario's)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Print every world event as a JSON line
        #[arg(short, long)]
        events: bool,

        /// Suppress the banner
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run one scenario over many seeds in parallel and aggregate statistics
    Batch {
        /// Scenario JSON file
        #[arg(required = true)]
        scenario: std::path::PathBuf,

        /// Number of runs (default: 100)
        #[arg(short, long, default_value = "100")]
        runs: u64,

        /// Starting seed (increments for each run)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Ticks per run (default: the scenario's)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Check a scenario: catalog, factions, loadouts and profiles
    Validate {
        /// Scenario JSON file
        #[arg(required = true)]
        scenario: std::path::PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Run {
            scenario,
            seed,
            ticks,
            format,
            events,
            quiet,
        } => cli::run::execute(scenario, seed, ticks, format, events, quiet),

        Commands::Batch {
            scenario,
            runs,
            seed,
            threads,
            ticks,
            format,
            progress,
        } => cli::batch::execute(scenario, runs, seed, threads, ticks, format, progress),

        Commands::Validate { scenario } => cli::validate::execute(scenario),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
