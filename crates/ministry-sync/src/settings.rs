//! Runtime settings for the sync layer, deserialised by the binaries from
//! their config sources.

use chrono::TimeDelta;
use serde::Deserialize;

use ministry_core::config::DEFAULT_ENDPOINT;

use crate::{SyncError, state::DEFAULT_LOCK_WINDOW_SECS};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
  /// Endpoint used until a config with `databaseUrl` is saved.
  pub default_endpoint:     String,
  /// Pulls within this many seconds of a local write are skipped.
  pub lock_window_secs:     i64,
  /// Per-request HTTP timeout.
  pub request_timeout_secs: u64,
}

impl Default for SyncSettings {
  fn default() -> Self {
    Self {
      default_endpoint:     DEFAULT_ENDPOINT.to_owned(),
      lock_window_secs:     DEFAULT_LOCK_WINDOW_SECS,
      request_timeout_secs: 30,
    }
  }
}

impl SyncSettings {
  /// `lock_window_secs` as a duration; negative or unrepresentable values
  /// are rejected.
  pub fn lock_window(&self) -> Result<TimeDelta, SyncError> {
    TimeDelta::try_seconds(self.lock_window_secs)
      .filter(|w| *w >= TimeDelta::zero())
      .ok_or(SyncError::LockWindow(self.lock_window_secs))
  }
}
