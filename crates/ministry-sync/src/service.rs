//! [`Ministry`] — the read/write contract the UI layer consumes.
//!
//! Reads go straight to the local store. Every write is persisted locally
//! first, then handed to the [`Reconciler`] as a background push, so callers
//! never wait on the network.

use std::sync::Arc;

use ministry_core::{
  Error, Result,
  activity::{BibleClass, BibleStudy, SmallGroup, StaffVisit},
  config::CloudConfig,
  insight::{ActivitySummary, InsightProvider},
  record::Record,
  storage::Storage,
  store::RecordStore,
  user::User,
  wire::MutationEvent,
};
use tokio::sync::broadcast;

use crate::{Reconciler, Remote, SyncError, SyncEvent, SyncSettings, SyncState};

/// Name reported as `executedBy` when nobody is logged in.
const SYSTEM_ACTOR: &str = "System";

pub struct Ministry<S, R> {
  store: Arc<RecordStore<S>>,
  sync:  Reconciler<S, R>,
}

impl<S, R> Ministry<S, R>
where
  S: Storage + 'static,
  R: Remote,
{
  /// Wire `store` to `remote` and seed the default administrator on first
  /// run.
  pub async fn open(
    store: RecordStore<S>,
    remote: R,
    settings: &SyncSettings,
  ) -> Result<Self, SyncError> {
    let window = settings.lock_window()?;
    let store = Arc::new(store.with_default_endpoint(settings.default_endpoint.clone()));
    store.ensure_seeded().await?;

    let state = SyncState::new(store.clock().clone(), window);
    let sync = Reconciler::new(store.clone(), remote, state);
    Ok(Self { store, sync })
  }

  pub fn store(&self) -> &RecordStore<S> { &self.store }

  pub fn reconciler(&self) -> &Reconciler<S, R> { &self.sync }

  pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> { self.sync.subscribe() }

  async fn actor_name(&self) -> String {
    self
      .store
      .current_user()
      .await
      .map(|u| u.name)
      .unwrap_or_else(|| SYSTEM_ACTOR.to_owned())
  }

  // ── Records ───────────────────────────────────────────────────────────────

  pub async fn records<T: Record>(&self) -> Vec<T> { self.store.records().await }

  /// Records the logged-in user may see; nothing when logged out.
  pub async fn visible<T: Record>(&self) -> Vec<T> {
    match self.store.current_user().await {
      Some(user) => self.store.visible_to(&user).await,
      None => Vec::new(),
    }
  }

  /// Persist `record` locally, then push it.
  pub async fn save<T: Record>(&self, record: T) -> Result<T> {
    let saved = self.store.save(record).await?;
    let event =
      MutationEvent::saved(&saved, self.actor_name().await, self.sync.state().now())?;
    self.sync.push(event).await;
    Ok(saved)
  }

  /// Remove `id` locally, then push the deletion. Absent ids change nothing
  /// locally but are still announced.
  pub async fn delete<T: Record>(&self, id: &str) -> Result<bool> {
    let removed = self.store.delete::<T>(id).await?;
    self.push_delete::<T>(id).await;
    Ok(removed)
  }

  /// [`Self::delete`], restricted to what the logged-in user may modify.
  pub async fn delete_owned<T: Record>(&self, id: &str) -> Result<bool> {
    let user = self.store.current_user().await.ok_or_else(|| Error::Forbidden {
      actor:      SYSTEM_ACTOR.to_owned(),
      collection: T::COLLECTION,
      id:         id.to_owned(),
    })?;
    let removed = self.store.delete_as::<T>(&user, id).await?;
    self.push_delete::<T>(id).await;
    Ok(removed)
  }

  async fn push_delete<T: Record>(&self, id: &str) {
    let event = MutationEvent::deleted(
      T::COLLECTION,
      id,
      self.actor_name().await,
      self.sync.state().now(),
    );
    self.sync.push(event).await;
  }

  // ── Session ───────────────────────────────────────────────────────────────

  pub async fn login(&self, email: &str, password: &str) -> Result<Option<User>> {
    self.store.login(email, password).await
  }

  pub async fn logout(&self) -> Result<()> { self.store.logout().await }

  pub async fn current_user(&self) -> Option<User> { self.store.current_user().await }

  /// Save `user` (with push) and make it the session user.
  pub async fn update_current_user(&self, user: User) -> Result<User> {
    let saved = self.save(user).await?;
    self.store.set_current_user(&saved).await?;
    Ok(saved)
  }

  // ── Config ────────────────────────────────────────────────────────────────

  pub async fn config(&self) -> CloudConfig { self.store.config().await }

  /// Persist `config` locally, then push it. The push goes to the endpoint
  /// named by the new config.
  pub async fn save_config(&self, config: &CloudConfig) -> Result<()> {
    self.store.save_config(config).await?;
    let event = MutationEvent::config_saved(
      config,
      self.actor_name().await,
      self.sync.state().now(),
    )?;
    self.sync.push(event).await;
    Ok(())
  }

  // ── Reconciliation ────────────────────────────────────────────────────────

  /// See [`Reconciler::pull`].
  pub async fn pull(&self) -> bool { self.sync.pull().await }

  /// Wait for outstanding pushes.
  pub async fn settle(&self) { self.sync.settle().await }

  // ── Insight ───────────────────────────────────────────────────────────────

  pub async fn summary(&self, year: i32, month: u32) -> ActivitySummary {
    ActivitySummary::for_month(
      year,
      month,
      &self.records::<BibleStudy>().await,
      &self.records::<BibleClass>().await,
      &self.records::<SmallGroup>().await,
      &self.records::<StaffVisit>().await,
    )
  }

  /// Insight text for the given month; see [`RecordStore::insight`].
  pub async fn insight<P: InsightProvider>(&self, provider: &P, year: i32, month: u32) -> String {
    let summary = self.summary(year, month).await.to_string();
    self.store.insight(provider, &summary).await
  }
}
