//! Client settings: an optional TOML file layered under `MINISTRY_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use ministry_store_sqlite::expand_tilde;
use ministry_sync::SyncSettings;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
  /// SQLite file holding the local record store.
  pub store_path: PathBuf,
  /// Endpoint, lock window and request timeout.
  #[serde(flatten)]
  pub sync:       SyncSettings,
}

impl Default for ClientSettings {
  fn default() -> Self {
    Self {
      store_path: PathBuf::from("~/.local/share/ministry/ministry.db"),
      sync:       SyncSettings::default(),
    }
  }
}

impl ClientSettings {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      // Typed values, since `flatten` bypasses the config crate's own
      // string-to-number coercion.
      .add_source(config::Environment::with_prefix("MINISTRY").try_parsing(true))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ClientSettings")
  }

  /// The store path with a leading `~` expanded.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}
