//! patclass - patent classification pipeline CLI
//!
//! Usage:
//!   patclass run patents.csv                      # Text pipeline with defaults
//!   patclass run patents.csv --kind category      # CPC-prefix pipeline
//!   patclass run --config run.toml --seed 7       # Config file plus overrides
//!   patclass inspect patents.csv                  # Record counts and class balance
//!   patclass --json run patents.csv               # Full report as JSON

use clap::{Parser, Subcommand};
use patclass::data::LABEL_COLUMN;
use patclass::pipeline::PipelineKind;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

use commands::{inspect, run};

/// patclass - Prepare, train and evaluate binary patent classifiers
#[derive(Parser)]
#[command(name = "patclass")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (stage logs on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, balance, split, train and evaluate
    Run(run::RunArgs),

    /// Show record counts and class balance of a dataset
    Inspect {
        /// Dataset file (csv, tsv, jsonl or json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Normalization preset to apply
        #[arg(long, default_value = "text")]
        kind: PipelineKind,

        /// Name of the binary label column
        #[arg(long, default_value = LABEL_COLUMN)]
        label_column: String,
    },
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run(args) => run::run(&args, cli.json, cli.quiet),
        Commands::Inspect {
            file,
            kind,
            label_column,
        } => inspect::run(&file, kind, &label_column, cli.json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}
