//! Integration tests for `SqliteStorage`, directly and under a
//! `RecordStore`.

use std::path::PathBuf;

use chrono::NaiveDate;
use ministry_core::{
  activity::StaffVisit,
  storage::{Storage, StorageKey},
  store::RecordStore,
  user::User,
};

use crate::SqliteStorage;

async fn storage() -> SqliteStorage {
  SqliteStorage::open_in_memory()
    .await
    .expect("in-memory storage")
}

fn scratch_db(name: &str) -> PathBuf {
  let nanos = std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .unwrap()
    .as_nanos();
  std::env::temp_dir().join(format!("ministry-{name}-{}-{nanos}.db", std::process::id()))
}

// ─── Key-value ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_key_reads_none() {
  let s = storage().await;
  assert_eq!(s.get(StorageKey::Studies).await.unwrap(), None);
}

#[tokio::test]
async fn put_then_get() {
  let s = storage().await;
  s.put(StorageKey::Users, "[]".into()).await.unwrap();
  assert_eq!(s.get(StorageKey::Users).await.unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn put_overwrites_existing_value() {
  let s = storage().await;
  s.put(StorageKey::Config, "{\"a\":1}".into()).await.unwrap();
  s.put(StorageKey::Config, "{\"a\":2}".into()).await.unwrap();
  assert_eq!(
    s.get(StorageKey::Config).await.unwrap().as_deref(),
    Some("{\"a\":2}")
  );
  assert_eq!(s.keys().await.unwrap(), ["config"]);
}

#[tokio::test]
async fn remove_is_idempotent() {
  let s = storage().await;
  s.put(StorageKey::CurrentSession, "{}".into()).await.unwrap();
  s.remove(StorageKey::CurrentSession).await.unwrap();
  s.remove(StorageKey::CurrentSession).await.unwrap();
  assert_eq!(s.get(StorageKey::CurrentSession).await.unwrap(), None);
}

#[tokio::test]
async fn keys_use_the_persisted_layout_names() {
  let s = storage().await;
  s.put(StorageKey::ChangeRequests, "[]".into()).await.unwrap();
  s.put(StorageKey::CurrentSession, "{}".into()).await.unwrap();
  s.put(StorageKey::Visits, "[]".into()).await.unwrap();
  assert_eq!(s.keys().await.unwrap(), ["change-requests", "current-session", "visits"]);
}

// ─── Under a RecordStore ─────────────────────────────────────────────────────

#[tokio::test]
async fn data_survives_reopening_the_file() {
  let path = scratch_db("reopen");

  {
    let store = RecordStore::new(SqliteStorage::open(&path).await.unwrap());
    store.ensure_seeded().await.unwrap();
    store
      .save(StaffVisit {
        id:              "v1".into(),
        date:            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        year:            0,
        month:           0,
        sector:          "Kitchen".into(),
        staff_name:      "Rita".into(),
        reason:          "Burnout".into(),
        needs_follow_up: true,
        observations:    String::new(),
        chaplain_id:     "admin".into(),
        created_at:      None,
      })
      .await
      .unwrap();
    store.login("admin@ministry.local", "admin").await.unwrap().unwrap();
  }

  let store = RecordStore::new(SqliteStorage::open(&path).await.unwrap());
  let visits = store.records::<StaffVisit>().await;
  assert_eq!(visits.len(), 1);
  assert_eq!((visits[0].year, visits[0].month), (2024, 2));
  assert_eq!(store.current_user().await, Some(User::default_admin()));
  assert!(!store.ensure_seeded().await.unwrap());

  for suffix in ["", "-wal", "-shm"] {
    std::fs::remove_file(format!("{}{suffix}", path.display())).ok();
  }
}
