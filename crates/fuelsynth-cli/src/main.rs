mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use fuelsynth_generate::{DEFAULT_ROWS_PER_FILE, ExportOptions, GenerationError};
use fuelsynth_sink::SinkError;
use logging::{LoggingError, init_logging};

const DEFAULT_PERIOD_SECONDS: u64 = 60;

#[derive(Debug, Error)]
enum CliError {
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("core error: {0}")]
    Core(#[from] fuelsynth_core::Error),
    #[error("export error: {0}")]
    Export(#[from] GenerationError),
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "fuelsynth", version, about = "Synthetic fuel transaction exporter")]
struct Cli {
    /// Append JSON log lines to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one batch and write it to a Parquet file.
    Export(ExportArgs),
    /// Export a batch every period until interrupted.
    Run(RunArgs),
    /// Print the file schema as JSON.
    Schema,
    /// Read a written batch file and summarize it.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Records per file.
    #[arg(
        long,
        default_value_t = DEFAULT_ROWS_PER_FILE as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    rows_per_file: u64,
    /// Directory for batch files; created when missing.
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,
    /// Seed for reproducible batches.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file overriding the built-in value pools.
    #[arg(long, value_name = "PATH")]
    pools: Option<PathBuf>,
    /// Also load each batch into this Postgres database.
    #[arg(
        long,
        env = "DATABASE_URL",
        value_name = "CONNECTION_STRING",
        hide_env_values = true
    )]
    database_url: Option<String>,
}

impl ExportArgs {
    fn options(&self) -> Result<ExportOptions, CliError> {
        let rows_per_file = usize::try_from(self.rows_per_file).map_err(|_| {
            CliError::InvalidConfig(format!("rows-per-file {} is too large", self.rows_per_file))
        })?;
        Ok(ExportOptions {
            out_dir: self.out_dir.clone(),
            rows_per_file,
            seed: self.seed,
        })
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    export: ExportArgs,
    /// Seconds to wait between batches.
    #[arg(
        long,
        default_value_t = DEFAULT_PERIOD_SECONDS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    period_seconds: u64,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Parquet file written by `export` or `run`.
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Command::Export(args) => commands::export(args).await,
        Command::Run(args) => commands::run(args).await,
        Command::Schema => commands::schema(),
        Command::Inspect(args) => commands::inspect(args),
    }
}
