//! ministry reference remote binary.
//!
//! Reads `remote.toml` (or the path given with `--config`) plus `MINISTRY_*`
//! environment variables, opens a SQLite store, and serves `/exec` over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use ministry_core::store::RecordStore;
use ministry_remote::ServerConfig;
use ministry_store_sqlite::{SqliteStorage, expand_tilde};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Ministry activity log reference remote")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "remote.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MINISTRY"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let storage = SqliteStorage::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let store = RecordStore::new(storage);
  if store.ensure_seeded().await? {
    tracing::info!("seeded default administrator");
  }

  let app = ministry_remote::router(Arc::new(store)).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}/exec");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
