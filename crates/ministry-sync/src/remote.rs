//! The [`Remote`] trait — the two calls the reconciler makes.

use std::future::Future;

use ministry_core::wire::{MutationEvent, Snapshot};

use crate::SyncError;

/// Transport to the spreadsheet-backed endpoint.
///
/// Implemented over HTTP by [`crate::HttpRemote`]; tests substitute an
/// in-memory fake.
pub trait Remote: Send + Sync + 'static {
  /// Read the full remote state (`GET <endpoint>?action=fetchAll`).
  fn fetch_all(
    &self,
    endpoint: &str,
  ) -> impl Future<Output = Result<Snapshot, SyncError>> + Send;

  /// Deliver one mutation event (`POST <endpoint>`). The response body is
  /// never interpreted.
  fn send(
    &self,
    endpoint: &str,
    event: &MutationEvent,
  ) -> impl Future<Output = Result<(), SyncError>> + Send;
}
