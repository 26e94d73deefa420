//! runbridge-replay - feed a recorded runner/UI event script through the sync core.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod config;
mod output;
mod replay;
mod script;

use config::ReplayConfig;

/// Replay a JSON-lines script of runner events and UI commands
#[derive(Parser, Debug)]
#[command(name = "runbridge-replay")]
#[command(about = "Replay runner events and UI commands through the sync core", long_about = None)]
#[command(version)]
struct Cli {
    /// Script to replay (JSON lines). Reads stdin when omitted
    script: Option<PathBuf>,

    /// Abort on the first failing step instead of reporting it and continuing
    #[arg(long)]
    stop_on_error: bool,

    /// Tracing filter for diagnostics written to stderr
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print the final phase and collaborator state after the script ends
    #[arg(long)]
    summary: bool,
}

impl From<Cli> for ReplayConfig {
    fn from(cli: Cli) -> Self {
        Self {
            script: cli.script,
            stop_on_error: cli.stop_on_error,
            log_filter: cli.log_level,
            summary: cli.summary,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ReplayConfig::from(Cli::parse());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let input: Box<dyn BufRead> = match &config.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let report = replay::replay(&config, input, &mut stdout.lock())?;

    if !report.is_success() {
        eprintln!("{} of {} lines failed", report.failures, report.steps + report.failures);
        std::process::exit(1);
    }

    Ok(())
}
