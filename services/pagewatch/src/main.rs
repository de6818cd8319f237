//! Pagewatch CLI
//!
//! Command-line interface for the web page change monitor.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pagewatch::{find_config, load_config, logging, Config, PagewatchError};
use tracing::Level;

#[derive(Parser)]
#[command(name = "pagewatch")]
#[command(about = "Watch a web page and send an email alert when it changes")]
#[command(version)]
struct Args {
    /// Path to configuration file (default: search ./configs/, /configs/, /run/secrets/)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

fn resolve_config(path: Option<&PathBuf>) -> pagewatch::Result<Config> {
    let path = match path {
        Some(path) => path.clone(),
        None => find_config()?,
    };
    tracing::debug!("Loading configuration from {:?}", path);
    load_config(&path)
}

fn fatal(err: &PagewatchError) -> ExitCode {
    tracing::error!(error = ?err, "{}: {}", err.category(), err);
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.log_level);

    tracing::debug!(
        "Parsed command line arguments: config={:?}, log_level={:?}",
        args.config,
        args.log_level
    );

    let config = match resolve_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => return fatal(&e),
    };

    tracing::info!("Starting pagewatch for {}", config.check_url);
    tracing::debug!(
        "Mode: {}, interval: {:?}, recipients: {}",
        config.mode.name(),
        config.check_interval,
        config.email.recipients.len()
    );

    match pagewatch::run(config).await {
        Ok(()) => {
            tracing::info!("Alert sent; exiting");
            ExitCode::SUCCESS
        }
        Err(e) => fatal(&e),
    }
}
