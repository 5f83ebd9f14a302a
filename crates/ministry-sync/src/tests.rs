//! Reconciler and facade tests against an in-memory fake remote.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use ministry_core::{
  Error,
  activity::{BibleClass, BibleStudy, Shift, SmallGroup, StaffVisit, StudyStatus},
  clock::ManualClock,
  config::CloudConfig,
  record::Collection,
  storage::MemoryStorage,
  store::RecordStore,
  user::{Role, User},
  wire::{EventType, MutationEvent, Snapshot},
};
use reqwest::StatusCode;
use serde_json::json;

use crate::{Ministry, Remote, SyncError, SyncEvent, SyncSettings};

// ─── Fake remote ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeState {
  /// Raw JSON answered to `fetch_all`.
  snapshot: String,
  failing:  bool,
  fetches:  usize,
  sent:     Vec<(String, MutationEvent)>,
}

#[derive(Clone, Default)]
struct FakeRemote(Arc<Mutex<FakeState>>);

impl FakeRemote {
  fn serving(snapshot: serde_json::Value) -> Self {
    let fake = Self::default();
    fake.set_snapshot(snapshot);
    fake
  }

  fn set_snapshot(&self, snapshot: serde_json::Value) {
    self.0.lock().unwrap().snapshot = snapshot.to_string();
  }

  fn set_raw(&self, raw: &str) { self.0.lock().unwrap().snapshot = raw.to_owned(); }

  fn fail(&self, failing: bool) { self.0.lock().unwrap().failing = failing; }

  fn fetches(&self) -> usize { self.0.lock().unwrap().fetches }

  fn sent(&self) -> Vec<(String, MutationEvent)> { self.0.lock().unwrap().sent.clone() }
}

impl Remote for FakeRemote {
  async fn fetch_all(&self, _endpoint: &str) -> Result<Snapshot, SyncError> {
    let mut state = self.0.lock().unwrap();
    state.fetches += 1;
    if state.failing {
      return Err(SyncError::Status(StatusCode::SERVICE_UNAVAILABLE));
    }
    Ok(serde_json::from_str(&state.snapshot)?)
  }

  async fn send(&self, endpoint: &str, event: &MutationEvent) -> Result<(), SyncError> {
    let mut state = self.0.lock().unwrap();
    if state.failing {
      return Err(SyncError::Status(StatusCode::INTERNAL_SERVER_ERROR));
    }
    state.sent.push((endpoint.to_owned(), event.clone()));
    Ok(())
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn t0() -> DateTime<Utc> { DateTime::from_timestamp(1_715_342_400, 0).unwrap() }

async fn ministry(remote: FakeRemote) -> (Ministry<MemoryStorage, FakeRemote>, ManualClock) {
  let clock = ManualClock::new(t0());
  let store = RecordStore::new(MemoryStorage::new()).with_clock(Arc::new(clock.clone()));
  let settings = SyncSettings {
    default_endpoint: "http://remote.test/exec".into(),
    ..SyncSettings::default()
  };
  let m = Ministry::open(store, remote, &settings).await.unwrap();
  (m, clock)
}

fn past_window(clock: &ManualClock) { clock.advance(TimeDelta::seconds(9)); }

fn study(id: &str) -> BibleStudy {
  BibleStudy {
    id:           id.into(),
    date:         NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
    year:         0,
    month:        0,
    sector:       "Cardiology".into(),
    patient_name: "João".into(),
    whatsapp:     None,
    status:       StudyStatus::Start,
    study_guide:  "Steps to Christ".into(),
    lesson:       "1".into(),
    observations: String::new(),
    chaplain_id:  "admin".into(),
    created_at:   None,
  }
}

fn class() -> BibleClass {
  BibleClass {
    id:           "k1".into(),
    date:         NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
    year:         0,
    month:        0,
    sector:       "Nursing".into(),
    students:     vec!["Ana".into()],
    study_guide:  "Acts".into(),
    lesson:       "2".into(),
    observations: String::new(),
    chaplain_id:  "admin".into(),
    created_at:   None,
  }
}

fn group() -> SmallGroup {
  SmallGroup {
    id:                 "g1".into(),
    date:               NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
    year:               0,
    month:              0,
    sector:             "Lobby".into(),
    group_name:         "Hope".into(),
    leader:             "Rui".into(),
    shift:              Shift::Afternoon,
    participants_count: 4,
    unit:               "main".into(),
    observations:       String::new(),
    chaplain_id:        "admin".into(),
    created_at:         None,
  }
}

fn visit() -> StaffVisit {
  StaffVisit {
    id:              "v1".into(),
    date:            NaiveDate::from_ymd_opt(2024, 5, 5).unwrap(),
    year:            0,
    month:           0,
    sector:          "Lab".into(),
    staff_name:      "Lia".into(),
    reason:          "Stress".into(),
    needs_follow_up: false,
    observations:    String::new(),
    chaplain_id:     "admin".into(),
    created_at:      None,
  }
}

// ─── Pull ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pull_inside_lock_window_is_skipped() {
  let remote = FakeRemote::serving(json!({ "studies": [] }));
  let (m, clock) = ministry(remote.clone()).await;
  let mut events = m.subscribe();

  m.save(study("s1")).await.unwrap();
  clock.advance(TimeDelta::seconds(7));

  assert!(m.pull().await);
  assert_eq!(remote.fetches(), 0);
  assert_eq!(m.records::<BibleStudy>().await.len(), 1);

  m.settle().await;
  let mut skipped = false;
  while let Ok(ev) = events.try_recv() {
    skipped |= matches!(ev, SyncEvent::PullSkipped { .. });
  }
  assert!(skipped);
}

#[tokio::test]
async fn pull_after_window_replaces_only_present_collections() {
  let remote = FakeRemote::default();
  let (m, clock) = ministry(remote.clone()).await;
  m.save(study("local")).await.unwrap();
  m.save(class()).await.unwrap();
  m.save(group()).await.unwrap();
  m.save(visit()).await.unwrap();
  m.settle().await;
  past_window(&clock);

  let remote_study = serde_json::to_value(study("remote")).unwrap();
  remote.set_snapshot(json!({ "studies": [remote_study] }));

  assert!(m.pull().await);
  assert_eq!(remote.fetches(), 1);

  let studies = m.records::<BibleStudy>().await;
  assert_eq!(studies.len(), 1);
  assert_eq!(studies[0].id, "remote");
  assert_eq!((studies[0].year, studies[0].month), (2024, 5));

  let kept: Option<BibleClass> = m.store().find("k1").await;
  assert!(kept.is_some());
  assert_eq!(m.records::<SmallGroup>().await.len(), 1);
  assert_eq!(m.records::<StaffVisit>().await.len(), 1);
  assert_eq!(m.records::<User>().await, vec![User::default_admin()]);
}

#[tokio::test]
async fn pull_can_empty_a_collection_explicitly() {
  let remote = FakeRemote::serving(json!({ "visits": [] }));
  let (m, clock) = ministry(remote).await;
  m.save(visit()).await.unwrap();
  past_window(&clock);

  assert!(m.pull().await);
  assert!(m.records::<StaffVisit>().await.is_empty());
}

#[tokio::test]
async fn pull_collapses_repeated_ids_keeping_the_last() {
  let remote = FakeRemote::default();
  let (m, clock) = ministry(remote.clone()).await;

  let mut first = study("dup");
  first.observations = "first row".into();
  let mut last = study("dup");
  last.observations = "appended row".into();
  remote.set_snapshot(json!({
    "studies": [
      serde_json::to_value(&first).unwrap(),
      serde_json::to_value(study("other")).unwrap(),
      serde_json::to_value(&last).unwrap(),
    ]
  }));
  past_window(&clock);
  assert!(m.pull().await);

  let studies = m.records::<BibleStudy>().await;
  let ids: Vec<_> = studies.iter().map(|s| s.id.as_str()).collect();
  assert_eq!(ids, ["dup", "other"]);
  assert_eq!(studies[0].observations, "appended row");

  m.save(study("dup")).await.unwrap();
  let studies = m.records::<BibleStudy>().await;
  assert_eq!(studies.iter().filter(|s| s.id == "dup").count(), 1);
  assert_eq!(studies.len(), 2);
}

#[tokio::test]
async fn failed_pull_returns_false_and_keeps_local_state() {
  let remote = FakeRemote::serving(json!({ "studies": [] }));
  let (m, clock) = ministry(remote.clone()).await;
  m.save(study("s1")).await.unwrap();
  m.settle().await;
  past_window(&clock);
  let mut events = m.subscribe();

  remote.fail(true);
  assert!(!m.pull().await);
  assert_eq!(m.records::<BibleStudy>().await.len(), 1);
  assert!(matches!(events.recv().await.unwrap(), SyncEvent::PullFailed { .. }));
}

#[tokio::test]
async fn malformed_snapshot_fails_without_partial_writes() {
  let remote = FakeRemote::default();
  let (m, clock) = ministry(remote.clone()).await;
  m.save(study("s1")).await.unwrap();
  past_window(&clock);

  // Valid users, broken studies: nothing may be applied.
  remote.set_raw(r#"{"users":[],"studies":[{"id":"x"}]}"#);
  assert!(!m.pull().await);
  assert_eq!(m.records::<User>().await.len(), 1);
  assert_eq!(m.records::<BibleStudy>().await.len(), 1);

  remote.set_raw("<html>quota exceeded</html>");
  assert!(!m.pull().await);
}

#[tokio::test]
async fn pull_without_endpoint_fails() {
  let remote = FakeRemote::serving(json!({ "studies": [] }));
  let (m, clock) = ministry(remote.clone()).await;
  m.save_config(&CloudConfig::with_endpoint("")).await.unwrap();
  past_window(&clock);

  assert!(!m.pull().await);
  assert_eq!(remote.fetches(), 0);
}

// ─── Push ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_pushes_type_timestamp_actor_and_record() {
  let remote = FakeRemote::default();
  let (m, _) = ministry(remote.clone()).await;
  m.login("admin@ministry.local", "admin").await.unwrap().unwrap();

  let saved = m.save(study("")).await.unwrap();
  m.settle().await;

  let sent = remote.sent();
  assert_eq!(sent.len(), 1);
  let (endpoint, event) = &sent[0];
  assert_eq!(endpoint, "http://remote.test/exec");
  assert_eq!(event.kind, EventType::SaveStudy);
  assert_eq!(event.timestamp, t0());
  assert_eq!(event.executed_by, "Administrator");
  assert_eq!(event.data, serde_json::to_value(&saved).unwrap());
}

#[tokio::test]
async fn delete_pushes_the_id_even_when_absent_locally() {
  let remote = FakeRemote::default();
  let (m, _) = ministry(remote.clone()).await;
  m.save(visit()).await.unwrap();
  m.settle().await;

  assert!(m.delete::<StaffVisit>("v1").await.unwrap());
  m.settle().await;
  assert!(!m.delete::<StaffVisit>("v1").await.unwrap());
  m.settle().await;

  let kinds: Vec<_> = remote.sent().into_iter().map(|(_, e)| e.kind).collect();
  assert_eq!(kinds, [EventType::SaveVisit, EventType::DeleteVisit, EventType::DeleteVisit]);
  let (_, last) = remote.sent().pop().unwrap();
  assert_eq!(last.data, json!({ "id": "v1" }));
  assert_eq!(last.executed_by, "System");
}

#[tokio::test]
async fn push_failures_are_swallowed_and_observable() {
  let remote = FakeRemote::default();
  remote.fail(true);
  let (m, _) = ministry(remote.clone()).await;
  let mut events = m.subscribe();

  let saved = m.save(class()).await.unwrap();
  m.settle().await;

  assert_eq!(m.records::<BibleClass>().await, vec![saved]);
  assert!(remote.sent().is_empty());
  match events.recv().await.unwrap() {
    SyncEvent::PushFailed { kind, error } => {
      assert_eq!(kind, EventType::SaveClass);
      assert!(error.contains("500"), "{error}");
    }
    other => panic!("unexpected event {other:?}"),
  }
}

#[tokio::test]
async fn rejected_record_is_neither_stored_nor_pushed() {
  let remote = FakeRemote::default();
  let (m, _) = ministry(remote.clone()).await;

  let mut empty = class();
  empty.students.clear();
  assert!(matches!(m.save(empty).await, Err(Error::Validation(_))));
  m.settle().await;

  assert!(m.records::<BibleClass>().await.is_empty());
  assert!(remote.sent().is_empty());
  assert!(m.reconciler().state().last_write_at().is_none());
}

#[tokio::test]
async fn config_save_pushes_to_the_new_endpoint() {
  let remote = FakeRemote::default();
  let (m, _) = ministry(remote.clone()).await;
  assert_eq!(m.config().await.database_url, "http://remote.test/exec");

  let mut cfg = CloudConfig::with_endpoint("http://moved.test/exec");
  cfg.spreadsheet_id = Some("sheet-1".into());
  m.save_config(&cfg).await.unwrap();
  m.settle().await;

  assert_eq!(m.config().await, cfg);
  let (endpoint, event) = remote.sent().pop().unwrap();
  assert_eq!(endpoint, "http://moved.test/exec");
  assert_eq!(event.kind, EventType::SaveConfig);
  assert_eq!(event.data["spreadsheetId"], "sheet-1");
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_current_user_saves_pushes_and_refreshes_session() {
  let remote = FakeRemote::default();
  let (m, _) = ministry(remote.clone()).await;
  let mut me = m.login("admin@ministry.local", "admin").await.unwrap().unwrap();

  me.name = "Head Chaplain".into();
  me.photo_url = Some("photos/me.png".into());
  m.update_current_user(me.clone()).await.unwrap();
  m.settle().await;

  assert_eq!(m.current_user().await, Some(me.clone()));
  assert_eq!(m.records::<User>().await, vec![me]);
  let (_, event) = remote.sent().pop().unwrap();
  assert_eq!(event.kind, EventType::SaveUser);
  // Attributed to the session as it was when the edit was made.
  assert_eq!(event.executed_by, "Administrator");
}

#[tokio::test]
async fn visibility_and_ownership_follow_the_session() {
  let remote = FakeRemote::default();
  let (m, _) = ministry(remote.clone()).await;

  m.save(study("admins")).await.unwrap();
  let mut theirs = study("chaplains");
  theirs.chaplain_id = "c1".into();
  m.save(theirs).await.unwrap();
  m.save(User {
    id:        "c1".into(),
    name:      "Chaplain One".into(),
    email:     "one@x.com".into(),
    password:  Some("pw".into()),
    role:      Role::Chaplain,
    photo_url: None,
  })
  .await
  .unwrap();

  assert!(m.visible::<BibleStudy>().await.is_empty(), "anonymous sees nothing");
  assert!(matches!(
    m.delete_owned::<BibleStudy>("chaplains").await,
    Err(Error::Forbidden { .. })
  ));

  m.login("ONE@x.com", "pw").await.unwrap().unwrap();
  let visible = m.visible::<BibleStudy>().await;
  assert_eq!(visible.len(), 1);
  assert_eq!(visible[0].id, "chaplains");
  assert!(matches!(
    m.delete_owned::<BibleStudy>("admins").await,
    Err(Error::Forbidden { collection: Collection::Studies, .. })
  ));
  assert!(m.delete_owned::<BibleStudy>("chaplains").await.unwrap());

  m.logout().await.unwrap();
  assert_eq!(m.current_user().await, None);
  assert_eq!(m.records::<BibleStudy>().await.len(), 1);
  assert_eq!(m.records::<User>().await.len(), 2);
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_edit_keeps_one_record_and_its_creation_time() {
  let remote = FakeRemote::default();
  let (m, clock) = ministry(remote.clone()).await;

  let created = m.save(study("")).await.unwrap();
  m.settle().await;
  assert!(!created.id.is_empty());
  assert_eq!((created.year, created.month), (2024, 5));

  clock.advance(TimeDelta::minutes(3));
  let mut edit = created.clone();
  edit.observations = "family present".into();
  m.save(edit).await.unwrap();
  m.settle().await;

  let all = m.records::<BibleStudy>().await;
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].created_at, Some(t0()));
  assert_eq!(all[0].observations, "family present");

  let sent = remote.sent();
  assert_eq!(sent.len(), 2);
  assert_eq!(sent[1].1.timestamp, t0() + TimeDelta::minutes(3));
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn out_of_range_lock_window_is_rejected_on_open() {
  for secs in [i64::MAX, -1] {
    let settings = SyncSettings { lock_window_secs: secs, ..SyncSettings::default() };
    let store = RecordStore::new(MemoryStorage::new());
    let err = Ministry::open(store, FakeRemote::default(), &settings).await.err();
    assert!(matches!(err, Some(SyncError::LockWindow(s)) if s == secs), "{secs}: {err:?}");
  }

  let settings = SyncSettings { lock_window_secs: 0, ..SyncSettings::default() };
  assert_eq!(settings.lock_window().unwrap(), TimeDelta::zero());
}
