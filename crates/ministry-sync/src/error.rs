//! Error type for `ministry-sync`.
//!
//! Apart from [`SyncError::LockWindow`], raised when opening a
//! [`Ministry`](crate::Ministry), none of these reach the caller of a store
//! operation: pull failures become `false`, push failures become a log line
//! and a [`SyncEvent`](crate::SyncEvent).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
  #[error("no remote endpoint configured")]
  NoEndpoint,

  #[error("lock window of {0} seconds is out of range")]
  LockWindow(i64),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("remote answered {0}")]
  Status(reqwest::StatusCode),

  #[error("malformed snapshot: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("local store error: {0}")]
  Store(#[from] ministry_core::Error),
}
