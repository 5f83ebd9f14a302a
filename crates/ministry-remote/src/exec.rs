//! Handlers for the single `/exec` endpoint.
//!
//! | Method | Query / Body | Notes |
//! |--------|--------------|-------|
//! | `GET`  | `?action=fetchAll` | Full [`Snapshot`]; any other action is a 400 |
//! | `POST` | [`MutationEvent`] JSON | Applied to the store; answers `{"status":"ok"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use ministry_core::{
  activity::{BibleClass, BibleStudy, SmallGroup, StaffVisit},
  change_request::ChangeRequest,
  config::CloudConfig,
  record::{Collection, Record},
  storage::Storage,
  store::RecordStore,
  user::User,
  wire::{EventType, FETCH_ALL, MutationEvent, Snapshot},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::ApiError;

// ─── Fetch ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExecParams {
  pub action: Option<String>,
}

/// `GET /exec?action=fetchAll`
pub async fn fetch<S: Storage + 'static>(
  State(store): State<Arc<RecordStore<S>>>,
  Query(params): Query<ExecParams>,
) -> Result<Json<Snapshot>, ApiError> {
  if params.action.as_deref() != Some(FETCH_ALL) {
    return Err(ApiError::BadRequest(format!(
      "unknown action: {}",
      params.action.as_deref().unwrap_or("<none>")
    )));
  }

  Ok(Json(Snapshot {
    users:   Some(store.records().await),
    studies: Some(store.records().await),
    classes: Some(store.records().await),
    groups:  Some(store.records().await),
    visits:  Some(store.records().await),
  }))
}

// ─── Apply ───────────────────────────────────────────────────────────────────

/// `POST /exec` — body: a [`MutationEvent`]
pub async fn apply<S: Storage + 'static>(
  State(store): State<Arc<RecordStore<S>>>,
  Json(event): Json<MutationEvent>,
) -> Result<Json<Value>, ApiError> {
  debug!(kind = ?event.kind, by = %event.executed_by, "applying event");

  match event.kind {
    EventType::SaveStudy => save::<S, BibleStudy>(&store, event.data).await?,
    EventType::SaveClass => save::<S, BibleClass>(&store, event.data).await?,
    EventType::SaveGroup => save::<S, SmallGroup>(&store, event.data).await?,
    EventType::SaveVisit => save::<S, StaffVisit>(&store, event.data).await?,
    EventType::SaveUser => save::<S, User>(&store, event.data).await?,
    EventType::SaveChangeRequest => {
      save::<S, ChangeRequest>(&store, event.data).await?
    }
    EventType::SaveConfig => {
      let config: CloudConfig = decode(event.data)?;
      store.save_config(&config).await?;
    }
    kind => {
      let id = event
        .deleted_id()
        .ok_or_else(|| ApiError::BadRequest("deletion without an id".into()))?;
      // Every non-config, non-save tag names a collection.
      if let Some(collection) = kind.collection() {
        let removed = delete(&store, collection, id).await?;
        info!(%collection, id, removed, "deleted");
      }
    }
  }

  Ok(Json(json!({ "status": "ok" })))
}

async fn save<S: Storage, T: Record>(
  store: &RecordStore<S>,
  data: Value,
) -> Result<(), ApiError> {
  let record = store.save(decode::<T>(data)?).await?;
  info!(collection = %T::COLLECTION, id = record.id(), "saved");
  Ok(())
}

async fn delete<S: Storage>(
  store: &RecordStore<S>,
  collection: Collection,
  id: &str,
) -> Result<bool, ApiError> {
  let removed = match collection {
    Collection::Studies => store.delete::<BibleStudy>(id).await?,
    Collection::Classes => store.delete::<BibleClass>(id).await?,
    Collection::Groups => store.delete::<SmallGroup>(id).await?,
    Collection::Visits => store.delete::<StaffVisit>(id).await?,
    Collection::Users => store.delete::<User>(id).await?,
    Collection::ChangeRequests => store.delete::<ChangeRequest>(id).await?,
  };
  Ok(removed)
}

fn decode<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, ApiError> {
  serde_json::from_value(data).map_err(|e| ApiError::BadRequest(e.to_string()))
}
