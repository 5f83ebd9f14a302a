//! [`Reconciler`] — pull remote snapshots, push local mutations.
//!
//! Pulls are last-write-wins per collection: every collection present in the
//! snapshot replaces the local one wholesale, with no per-record merge.
//! Concurrent writes from several clients can therefore lose data; this is
//! accepted for single-team use.

use std::sync::{Arc, Mutex, PoisonError};

use ministry_core::{
  record::{Collection, Record},
  storage::Storage,
  store::RecordStore,
  wire::{MutationEvent, Snapshot},
};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{Remote, SyncError, SyncEvent, SyncState};

/// Buffered sync events per subscriber before old ones are dropped.
const EVENT_CAPACITY: usize = 64;

pub struct Reconciler<S, R> {
  store:     Arc<RecordStore<S>>,
  remote:    Arc<R>,
  state:     SyncState,
  events:    broadcast::Sender<SyncEvent>,
  in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl<S, R> Reconciler<S, R>
where
  S: Storage + 'static,
  R: Remote,
{
  pub fn new(store: Arc<RecordStore<S>>, remote: R, state: SyncState) -> Self {
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    Self {
      store,
      remote: Arc::new(remote),
      state,
      events,
      in_flight: Mutex::new(Vec::new()),
    }
  }

  pub fn state(&self) -> &SyncState { &self.state }

  /// Receive every [`SyncEvent`] emitted from now on.
  pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> { self.events.subscribe() }

  fn emit(&self, event: SyncEvent) {
    // No subscribers is fine.
    let _ = self.events.send(event);
  }

  // ── Pull ──────────────────────────────────────────────────────────────────

  /// Replace local collections with the remote snapshot.
  ///
  /// Returns `true` on success, and also when skipped because a local write
  /// happened within the lock window. Returns `false`, leaving local data
  /// untouched, if the remote could not be reached or its answer decoded.
  pub async fn pull(&self) -> bool {
    if let Some(since_write) = self.state.locked_for() {
      debug!(?since_write, "pull suppressed after recent write");
      self.emit(SyncEvent::PullSkipped { since_write });
      return true;
    }

    let endpoint = self.store.config().await.database_url;
    match self.try_pull(&endpoint).await {
      Ok(collections) => {
        info!(?collections, "pulled remote snapshot");
        self.emit(SyncEvent::Pulled { collections });
        true
      }
      Err(e) => {
        warn!(error = %e, endpoint = %endpoint, "pull failed");
        self.emit(SyncEvent::PullFailed { error: e.to_string() });
        false
      }
    }
  }

  async fn try_pull(&self, endpoint: &str) -> Result<Vec<Collection>, SyncError> {
    if endpoint.trim().is_empty() {
      return Err(SyncError::NoEndpoint);
    }

    // Fully decoded before anything local is touched.
    let snapshot = self.remote.fetch_all(endpoint).await?;
    let applied = snapshot.present();

    let Snapshot { users, studies, classes, groups, visits } = snapshot;
    if let Some(users) = users {
      self.store.replace(&users).await?;
    }
    if let Some(studies) = studies {
      self.store.replace(&derived(studies)).await?;
    }
    if let Some(classes) = classes {
      self.store.replace(&derived(classes)).await?;
    }
    if let Some(groups) = groups {
      self.store.replace(&derived(groups)).await?;
    }
    if let Some(visits) = visits {
      self.store.replace(&derived(visits)).await?;
    }

    Ok(applied)
  }

  // ── Push ──────────────────────────────────────────────────────────────────

  /// Stamp a local write and deliver `event` in the background.
  ///
  /// Never waits on the network and never fails: the outcome is logged and
  /// broadcast as a [`SyncEvent`]. There is no retry.
  pub async fn push(&self, event: MutationEvent) {
    self.state.record_write();
    let endpoint = self.store.config().await.database_url;

    let remote = self.remote.clone();
    let events = self.events.clone();
    let handle = tokio::spawn(async move {
      let kind = event.kind;
      let result: Result<(), SyncError> = if endpoint.trim().is_empty() {
        Err(SyncError::NoEndpoint)
      } else {
        remote.send(&endpoint, &event).await
      };

      let outcome = match result {
        Ok(()) => {
          debug!(?kind, "push delivered");
          SyncEvent::Pushed { kind, at: event.timestamp }
        }
        Err(e) => {
          warn!(?kind, error = %e, "push dropped");
          SyncEvent::PushFailed { kind, error: e.to_string() }
        }
      };
      let _ = events.send(outcome);
    });

    let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
    in_flight.retain(|h| !h.is_finished());
    in_flight.push(handle);
  }

  /// Wait for every push issued so far to finish.
  pub async fn settle(&self) {
    let handles = std::mem::take(
      &mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner),
    );
    for handle in handles {
      if let Err(e) = handle.await {
        warn!(error = %e, "push task aborted");
      }
    }
  }
}

/// Recompute derived fields on records arriving from the remote.
fn derived<T: Record>(mut records: Vec<T>) -> Vec<T> {
  records.iter_mut().for_each(T::derive);
  records
}
