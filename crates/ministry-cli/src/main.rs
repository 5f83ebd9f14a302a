//! `ministry` — command-line driver for the ministry activity log.
//!
//! # Usage
//!
//! ```
//! ministry login chaplain@hospital.org --password secret
//! ministry pull
//! ministry save studies study.json
//! ministry summary --year 2024 --month 5
//! ```

mod commands;
mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use ministry_core::{record::Collection, store::RecordStore};
use ministry_store_sqlite::SqliteStorage;
use ministry_sync::{HttpRemote, Ministry};
use settings::ClientSettings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "ministry", version, about = "Chaplaincy activity log")]
struct Args {
  /// Path to a TOML settings file.
  #[arg(short, long, value_name = "FILE", default_value = "ministry.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Start a session.
  Login {
    email:    String,
    /// Read from stdin when omitted.
    #[arg(long, env = "MINISTRY_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },
  /// End the session.
  Logout,
  /// Show the logged-in user.
  Whoami,
  /// Replace local collections with the remote snapshot.
  Pull,
  /// Print the records of a collection visible to the session user.
  List { collection: Collection },
  /// Save one record given as JSON (`-` reads stdin).
  Save { collection: Collection, input: PathBuf },
  /// Delete a record the session user may modify.
  Delete { collection: Collection, id: String },
  /// Inspect or change the tenant configuration.
  #[command(subcommand)]
  Config(ConfigCommand),
  /// Print activity counts for one month.
  Summary {
    #[arg(long)]
    year:  Option<i32>,
    #[arg(long)]
    month: Option<u32>,
  },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
  Show,
  /// Point pulls and pushes at a new remote endpoint.
  SetEndpoint { url: String },
}

pub type App = Ministry<SqliteStorage, HttpRemote>;

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let settings = ClientSettings::load(&args.config)?;

  let store_path = settings.store_path();
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  let storage = SqliteStorage::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let remote = HttpRemote::new(Duration::from_secs(settings.sync.request_timeout_secs))
    .context("failed to build HTTP client")?;
  let app = Ministry::open(RecordStore::new(storage), remote, &settings.sync)
    .await
    .context("failed to open record store")?;

  let result = commands::run(&app, args.command).await;

  // Pushes are fire-and-forget; give them a chance to land before exiting.
  app.settle().await;
  result
}
