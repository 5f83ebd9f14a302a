//! The persistent key-value medium underneath the record store.
//!
//! Each collection (and each singleton such as the config or the session
//! marker) lives under one [`StorageKey`] as a JSON document. Backends only
//! move strings; encoding is the store's job.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Every entry the application persists locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
  Studies,
  Classes,
  Groups,
  Users,
  Config,
  ChangeRequests,
  CurrentSession,
  Visits,
  InsightCache,
}

impl StorageKey {
  /// The key string used by persistent backends.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Studies => "studies",
      Self::Classes => "classes",
      Self::Groups => "groups",
      Self::Users => "users",
      Self::Config => "config",
      Self::ChangeRequests => "change-requests",
      Self::CurrentSession => "current-session",
      Self::Visits => "visits",
      Self::InsightCache => "insight-cache",
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a local key-value backend.
///
/// All methods return `Send` futures so stores can be shared across tokio
/// tasks and axum handlers.
pub trait Storage: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the raw value under `key`; `None` if it was never written.
  fn get(
    &self,
    key: StorageKey,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Overwrite the value under `key`.
  fn put(
    &self,
    key: StorageKey,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove `key`. Removing an absent key is not an error.
  fn remove(
    &self,
    key: StorageKey,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

impl<S: Storage> Storage for Arc<S> {
  type Error = S::Error;

  fn get(
    &self,
    key: StorageKey,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_ {
    (**self).get(key)
  }

  fn put(
    &self,
    key: StorageKey,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    (**self).put(key, value)
  }

  fn remove(
    &self,
    key: StorageKey,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    (**self).remove(key)
  }
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A process-local backend; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }

  fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<StorageKey, String>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl Storage for MemoryStorage {
  type Error = Infallible;

  async fn get(&self, key: StorageKey) -> Result<Option<String>, Infallible> {
    Ok(self.entries().get(&key).cloned())
  }

  async fn put(&self, key: StorageKey, value: String) -> Result<(), Infallible> {
    self.entries().insert(key, value);
    Ok(())
  }

  async fn remove(&self, key: StorageKey) -> Result<(), Infallible> {
    self.entries().remove(&key);
    Ok(())
  }
}
