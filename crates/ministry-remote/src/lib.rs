//! Reference remote for the ministry activity log.
//!
//! Exposes an axum [`Router`] that speaks the same two-request protocol as
//! the production remote, backed by any [`RecordStore`]. Clients pull the
//! whole state with `GET /exec?action=fetchAll` and push one
//! [`ministry_core::wire::MutationEvent`] per `POST /exec`.

pub mod error;
pub mod exec;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use ministry_core::{storage::Storage, store::RecordStore};
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from the config file and
/// `MINISTRY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5290 }

fn default_store_path() -> PathBuf { PathBuf::from("remote.db") }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the remote's [`Router`] for `store`.
pub fn router<S: Storage + 'static>(store: Arc<RecordStore<S>>) -> Router {
  Router::new()
    .route("/exec", get(exec::fetch::<S>).post(exec::apply::<S>))
    .with_state(store)
}
