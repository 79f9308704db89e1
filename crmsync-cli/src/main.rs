//! crmsync batch runner
//!
//! Brings the CRM's contacts, list status and tags in line with the local
//! person records.
//!
//! Usage:
//!   crmsync --config crmsync.json [--person <uuid>] [--verbose]
//!
//! Exits non-zero if any person failed to sync.

use anyhow::Result;
use clap::Parser;
use crmsync_cli::{AppConfig, run};
use crmsync_types::PersonId;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "crmsync")]
#[command(about = "Sync local persons to CRM contacts, list status and tags")]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "crmsync.json")]
    config: PathBuf,

    /// Sync only this person
    #[arg(short, long)]
    person: Option<PersonId>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::load(&args.config)?;
    let summary = run(&config, args.person).await?;

    println!("{summary}");
    if summary.is_success() {
        info!("Sync complete");
        return Ok(ExitCode::SUCCESS);
    }
    for failure in &summary.failures {
        error!("{} ({:?}): {}", failure.person_id, failure.kind, failure.message);
    }
    Ok(ExitCode::FAILURE)
}
