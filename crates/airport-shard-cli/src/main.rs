//! Command-line front-end: generate a sharded layout from a CSV export and
//! resolve codes against it.

mod ingest;

use airport_shard_lib::{AirportLookup, FsUnitStore, ShardError, generate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "airport-shard", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the sharded unit layout from an airports CSV export
    Generate {
        /// CSV file with airport records (header row required)
        #[arg(long)]
        input: PathBuf,
        /// Directory to write units into; replaced wholesale if it exists
        #[arg(long)]
        output: PathBuf,
    },
    /// Resolve IATA codes against a generated layout
    Lookup {
        /// Root directory of a generated layout
        #[arg(long)]
        data: PathBuf,
        /// Codes to resolve, any case
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Ingest(#[from] ingest::IngestError),

    #[error(transparent)]
    Shard(#[from] ShardError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match cli.command {
        Command::Generate { input, output } => run_generate(&input, &output),
        Command::Lookup { data, codes } => run_lookup(data, &codes),
    }
}

fn run_generate(input: &PathBuf, output: &PathBuf) -> Result<ExitCode, CliError> {
    let report = ingest::read_airports_csv(input)?;

    // Regeneration replaces the layout as a whole; stale units from a
    // previous run must not survive underneath the new ones.
    if output.exists() {
        std::fs::remove_dir_all(output)?;
    }
    let store = FsUnitStore::new(output.clone());
    let generated = generate(report.airports, &store)?;

    tracing::info!(
        records = generated.tree.record_count,
        duplicates = generated.tree.duplicate_codes,
        units = generated.emit.units_emitted,
        output = %output.display(),
        "generation complete"
    );
    Ok(ExitCode::SUCCESS)
}

fn run_lookup(data: PathBuf, codes: &[String]) -> Result<ExitCode, CliError> {
    let lookup = AirportLookup::new(Arc::new(FsUnitStore::new(data)));
    let runtime = tokio::runtime::Builder::new_multi_thread().build()?;

    let mut missing = 0usize;
    runtime.block_on(async {
        for code in codes {
            match lookup.lookup(code).await {
                Some(airport) => match serde_json::to_string(&airport) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::error!(code, error = %e, "failed to encode record"),
                },
                None => {
                    eprintln!("{}: not found", code.trim().to_ascii_uppercase());
                    missing += 1;
                }
            }
        }
    });

    if missing == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
