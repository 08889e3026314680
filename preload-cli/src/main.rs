//! Preload seeding tool
//!
//! Loads exported JSON records into a local object store so an app can start
//! with its data already on disk.
//!
//! Usage:
//!   preload --db app.db json export.json
//!   preload --db app.db dir ./export
//!   preload --db app.db files Player.json "_Join:friends:Player:Player.json"
//!
//! Classes already present in the store are skipped, so the tool can run on
//! every launch.

use std::{path::PathBuf, sync::Arc};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use preload_import::{ImportConfig, Orchestrator, Outcome};
use preload_store::SqliteStore;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "preload")]
#[command(about = "Seed a local object store from exported JSON")]
struct Args {
    /// Path to the local store database
    #[arg(long, default_value = "preload.db")]
    db: PathBuf,

    /// Log import progress and debug detail
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    source: Source,
}

#[derive(Subcommand, Debug)]
enum Source {
    /// One JSON object mapping batch names to record lists
    Json { file: PathBuf },
    /// A directory with one file per batch
    Dir { dir: PathBuf },
    /// Explicit per-batch files
    Files {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let store = SqliteStore::open(&args.db)
        .with_context(|| format!("opening store at {}", args.db.display()))?;
    let config = ImportConfig::default().with_trace(args.verbose);
    let orchestrator = Orchestrator::with_config(Arc::new(store), config);

    let outcome = match &args.source {
        Source::Json { file } => orchestrator
            .load_json(file)
            .await
            .with_context(|| format!("loading {}", file.display()))?,
        Source::Dir { dir } => orchestrator
            .load_directory(dir)
            .await
            .with_context(|| format!("loading {}", dir.display()))?,
        Source::Files { files } => orchestrator
            .load_files(files.as_slice())
            .await
            .context("loading files")?,
    };

    report(&outcome);
    if !outcome.is_success() {
        bail!("{} import units failed", outcome.failed.len());
    }
    Ok(())
}

fn report(outcome: &Outcome) {
    for imported in &outcome.imported {
        info!("{}", imported.message);
    }
    for skipped in &outcome.skipped {
        info!("{}", skipped.message);
    }
    for failure in &outcome.failed {
        warn!("{}: {}", failure.unit, failure.error);
    }
    info!("Done: {}", outcome);
}
