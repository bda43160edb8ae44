//! `cadence`: command-line habit tracker.
//!
//! # Usage
//!
//! ```text
//! cadence user add alice
//! cadence habit add --user alice "Read 20 pages" --periodicity daily
//! cadence check --user alice <habit-id> --mood 7
//! cadence stats --user alice
//! cadence best --user alice
//! ```

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cadence_core::engine::StreakEngine;
use cadence_store_sqlite::SqliteStore;
use chrono::{Local, NaiveDate};
use clap::Parser;
use commands::Command;
use settings::{Settings, expand_tilde};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cadence", version, about = "Track daily and weekly habits and their streaks")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "cadence.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `store_path` from the config.
  #[arg(long, value_name = "FILE", env = "CADENCE_STORE")]
  store: Option<PathBuf>,

  /// Reference date for current streaks (default: today, local time).
  #[arg(long, value_name = "YYYY-MM-DD")]
  today: Option<NaiveDate>,

  #[command(subcommand)]
  command: Command,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let settings = Settings::load(&args.config)?;

  // CLI flag overrides config file and environment.
  let store_path = expand_tilde(args.store.as_deref().unwrap_or(&settings.store_path));
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::debug!(?store_path, "opened store");

  let today = args.today.unwrap_or_else(|| Local::now().date_naive());
  commands::run(args.command, &StreakEngine::new(store), today).await
}
