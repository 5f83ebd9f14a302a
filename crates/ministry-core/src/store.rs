//! [`RecordStore`] — typed collections over a key-value [`Storage`].
//!
//! Every collection is one JSON array under its [`StorageKey`]. Reads decode
//! the whole array; writes re-encode it. Order is insertion order. Nothing is
//! cached in memory: the storage medium is the single source of truth.
//!
//! The store is purely local. Notifying the remote after a mutation is the
//! job of the sync layer that wraps it.

use std::{collections::HashMap, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  clock::{Clock, SystemClock},
  config::DEFAULT_ENDPOINT,
  record::Record,
  storage::{Storage, StorageKey},
  user::User,
};

// ─── Store ───────────────────────────────────────────────────────────────────

pub struct RecordStore<S> {
  storage:                 S,
  clock:                   Arc<dyn Clock>,
  pub(crate) default_endpoint: String,
}

impl<S: Storage> RecordStore<S> {
  pub fn new(storage: S) -> Self {
    Self {
      storage,
      clock: Arc::new(SystemClock),
      default_endpoint: DEFAULT_ENDPOINT.to_owned(),
    }
  }

  /// Use `clock` for creation timestamps.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  /// Endpoint written into the synthesised config when none was saved.
  pub fn with_default_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.default_endpoint = endpoint.into();
    self
  }

  pub fn storage(&self) -> &S { &self.storage }

  pub fn clock(&self) -> &Arc<dyn Clock> { &self.clock }

  // ── Raw values ──────────────────────────────────────────────────────────

  /// Decode the value under `key`. A storage failure or an undecodable value
  /// reads as absent.
  pub(crate) async fn read_value<V: DeserializeOwned>(
    &self,
    key: StorageKey,
  ) -> Option<V> {
    let raw = match self.storage.get(key).await {
      Ok(raw) => raw?,
      Err(e) => {
        warn!(key = key.as_str(), error = %e, "storage read failed");
        return None;
      }
    };
    match serde_json::from_str(&raw) {
      Ok(v) => Some(v),
      Err(e) => {
        warn!(key = key.as_str(), error = %e, "discarding undecodable entry");
        None
      }
    }
  }

  pub(crate) async fn write_value<V: Serialize + ?Sized>(
    &self,
    key: StorageKey,
    value: &V,
  ) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    debug!(key = key.as_str(), bytes = raw.len(), "persisting");
    self.storage.put(key, raw).await.map_err(Error::storage)
  }

  pub(crate) async fn clear(&self, key: StorageKey) -> Result<()> {
    self.storage.remove(key).await.map_err(Error::storage)
  }

  // ── Seeding ─────────────────────────────────────────────────────────────

  /// Seed the default administrator if no user collection exists yet.
  /// Returns whether seeding happened.
  pub async fn ensure_seeded(&self) -> Result<bool> {
    let existing = self
      .storage
      .get(StorageKey::Users)
      .await
      .map_err(Error::storage)?;
    if existing.is_some() {
      return Ok(false);
    }
    debug!("seeding default administrator");
    self.write_value(StorageKey::Users, &[User::default_admin()]).await?;
    Ok(true)
  }

  // ── Collections ─────────────────────────────────────────────────────────

  /// Every record of `T`'s collection, in insertion order.
  pub async fn records<T: Record>(&self) -> Vec<T> {
    self
      .read_value(T::COLLECTION.storage_key())
      .await
      .unwrap_or_default()
  }

  /// The record with `id`, if stored.
  pub async fn find<T: Record>(&self, id: &str) -> Option<T> {
    self.records::<T>().await.into_iter().find(|r| r.id() == id)
  }

  /// Validate, normalise and upsert `record`; returns what was persisted.
  ///
  /// An empty id is replaced with a fresh UUID. An existing id is replaced in
  /// place, keeping its creation timestamp and owner.
  pub async fn save<T: Record>(&self, mut record: T) -> Result<T> {
    record.validate()?;

    if record.id().trim().is_empty() {
      record.set_id(Uuid::new_v4().to_string());
    }

    let mut records = self.records::<T>().await;
    let position = records.iter().position(|r| r.id() == record.id());

    record.normalize(position.map(|i| &records[i]), self.clock.now());

    match position {
      Some(i) => records[i] = record.clone(),
      None => records.push(record.clone()),
    }

    self.write_value(T::COLLECTION.storage_key(), &records).await?;
    Ok(record)
  }

  /// Remove the record with `id`. Returns `false`, writing nothing, if no
  /// such record exists.
  pub async fn delete<T: Record>(&self, id: &str) -> Result<bool> {
    let mut records = self.records::<T>().await;
    let before = records.len();
    records.retain(|r| r.id() != id);
    if records.len() == before {
      return Ok(false);
    }
    self.write_value(T::COLLECTION.storage_key(), &records).await?;
    Ok(true)
  }

  /// Overwrite the whole collection. Used when a remote snapshot wins.
  ///
  /// Repeated ids collapse to one entry: the last occurrence wins, at the
  /// position where the id first appeared.
  pub async fn replace<T: Record>(&self, records: &[T]) -> Result<()> {
    let mut unique: Vec<T> = Vec::with_capacity(records.len());
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    for record in records {
      match seen.get(record.id()) {
        Some(&i) => unique[i] = record.clone(),
        None => {
          seen.insert(record.id(), unique.len());
          unique.push(record.clone());
        }
      }
    }

    if unique.len() < records.len() {
      debug!(
        collection = %T::COLLECTION,
        dropped = records.len() - unique.len(),
        "collapsed duplicate ids"
      );
    }
    self.write_value(T::COLLECTION.storage_key(), &unique).await
  }

  // ── Access ──────────────────────────────────────────────────────────────

  /// The records `user` may see: everything for an administrator, only
  /// their own otherwise.
  pub async fn visible_to<T: Record>(&self, user: &User) -> Vec<T> {
    let mut records = self.records::<T>().await;
    if !user.is_admin() {
      records.retain(|r| r.owner() == Some(user.id.as_str()));
    }
    records
  }

  /// Like [`Self::delete`], but refuses when `user` may not modify the
  /// record.
  pub async fn delete_as<T: Record>(&self, user: &User, id: &str) -> Result<bool> {
    let Some(record) = self.find::<T>(id).await else {
      return Ok(false);
    };
    if !can_modify(user, &record) {
      return Err(Error::Forbidden {
        actor:      user.id.clone(),
        collection: T::COLLECTION,
        id:         id.to_owned(),
      });
    }
    self.delete::<T>(id).await
  }
}

/// Administrators may modify anything; everyone else only what they own.
pub fn can_modify<T: Record>(user: &User, record: &T) -> bool {
  user.is_admin() || record.owner() == Some(user.id.as_str())
}
