//! CLI definitions using clap.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::analyze::{self, RunOutcome};
use crate::config::{
    AnalyzerConfig, RecordFilter, DEFAULT_DB_PATH, DEFAULT_ENDPOINT_HOST, DEFAULT_EXCLUDED_MODEL,
};


/// Exit code for a run that matched no records.
const EXIT_NO_RECORDS: u8 = 2;


/// Token usage statistics for proxied Claude API requests, grouped by rate-limit status
#[derive(Parser, Debug)]
#[command(name = "gacu")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Examples:
  gacu --db ./logs/logs.db
  gacu --db /path/to/logs.db --start \"2025-08-26 10:00:00\" --end \"2025-08-26 20:00:00\"
  gacu --db ./logs/logs.db --debug")]
pub struct Cli {
    /// SQLite request log database
    #[arg(long, env = "GACU_DB", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Window start, GMT+8 (YYYY-MM-DD HH:MM:SS)
    #[arg(long, default_value = "2025-08-26 14:00:00")]
    start: String,

    /// Window end, GMT+8 (YYYY-MM-DD HH:MM:SS)
    #[arg(long, default_value = "2025-08-26 18:00:00")]
    end: String,

    /// Only count requests whose endpoint contains this host
    #[arg(long, default_value = DEFAULT_ENDPOINT_HOST)]
    host: String,

    /// Skip models whose name contains this substring (case-sensitive)
    #[arg(long, default_value = DEFAULT_EXCLUDED_MODEL)]
    exclude_model: String,

    /// Parse records on all cores
    #[arg(long)]
    parallel: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log per-record and per-line parsing details
    #[arg(long)]
    debug: bool,
}


impl Cli {
    fn into_config(self) -> AnalyzerConfig {
        AnalyzerConfig {
            db_path: self.db,
            start: self.start,
            end: self.end,
            filter: RecordFilter {
                endpoint_host: self.host,
                excluded_model: self.exclude_model,
            },
            parallel: self.parallel,
            json: self.json,
        }
    }
}


fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("gacu=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gacu=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}


/// Run the CLI
pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    tracing::debug!("debug logging enabled");

    match analyze::run(&cli.into_config())? {
        RunOutcome::Reported => Ok(ExitCode::SUCCESS),
        RunOutcome::NoRecords => {
            eprintln!("No matching records found in the given time range.");
            Ok(ExitCode::from(EXIT_NO_RECORDS))
        }
    }
}
