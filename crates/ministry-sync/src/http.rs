//! [`HttpRemote`] — the [`Remote`] implementation over `reqwest`.

use std::time::Duration;

use ministry_core::wire::{FETCH_ALL, MutationEvent, Snapshot};
use reqwest::Client;
use tracing::debug;

use crate::{Remote, SyncError};

/// Async HTTP transport to the remote endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpRemote {
  client: Client,
}

impl HttpRemote {
  pub fn new(timeout: Duration) -> Result<Self, SyncError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client })
  }
}

impl Remote for HttpRemote {
  /// `GET <endpoint>?action=fetchAll`
  async fn fetch_all(&self, endpoint: &str) -> Result<Snapshot, SyncError> {
    let resp = self
      .client
      .get(endpoint)
      .query(&[("action", FETCH_ALL)])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(SyncError::Status(resp.status()));
    }
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
  }

  /// `POST <endpoint>` with the event as JSON. Whatever comes back is
  /// ignored.
  async fn send(&self, endpoint: &str, event: &MutationEvent) -> Result<(), SyncError> {
    let resp = self.client.post(endpoint).json(event).send().await?;
    debug!(kind = ?event.kind, status = %resp.status(), "event delivered");
    Ok(())
  }
}
