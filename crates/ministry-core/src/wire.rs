//! JSON shapes exchanged with the remote endpoint.
//!
//! | Direction | Shape |
//! |-----------|-------|
//! | `GET ?action=fetchAll` → | [`Snapshot`] |
//! | `POST` ← | [`MutationEvent`] |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  Result,
  activity::{BibleClass, BibleStudy, SmallGroup, StaffVisit},
  config::CloudConfig,
  record::{Collection, Record},
  user::User,
};

/// Query value selecting the full snapshot read.
pub const FETCH_ALL: &str = "fetchAll";

// ─── Events ──────────────────────────────────────────────────────────────────

/// Which collection and operation a pushed [`MutationEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
  SaveStudy,
  DeleteStudy,
  SaveClass,
  DeleteClass,
  SaveGroup,
  DeleteGroup,
  SaveVisit,
  DeleteVisit,
  SaveUser,
  DeleteUser,
  SaveChangeRequest,
  DeleteChangeRequest,
  SaveConfig,
}

impl EventType {
  /// The collection the event targets; `None` for the config singleton.
  pub fn collection(self) -> Option<Collection> {
    match self {
      Self::SaveStudy | Self::DeleteStudy => Some(Collection::Studies),
      Self::SaveClass | Self::DeleteClass => Some(Collection::Classes),
      Self::SaveGroup | Self::DeleteGroup => Some(Collection::Groups),
      Self::SaveVisit | Self::DeleteVisit => Some(Collection::Visits),
      Self::SaveUser | Self::DeleteUser => Some(Collection::Users),
      Self::SaveChangeRequest | Self::DeleteChangeRequest => {
        Some(Collection::ChangeRequests)
      }
      Self::SaveConfig => None,
    }
  }

  pub fn is_delete(self) -> bool {
    matches!(
      self,
      Self::DeleteStudy
        | Self::DeleteClass
        | Self::DeleteGroup
        | Self::DeleteVisit
        | Self::DeleteUser
        | Self::DeleteChangeRequest
    )
  }
}

/// One local mutation, as sent to the remote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationEvent {
  #[serde(rename = "type")]
  pub kind:        EventType,
  pub timestamp:   DateTime<Utc>,
  /// Display name of the acting user.
  pub executed_by: String,
  /// The saved record, the config, or `{"id": ...}` for a deletion.
  pub data:        serde_json::Value,
}

impl MutationEvent {
  pub fn saved<T: Record>(
    record: &T,
    executed_by: impl Into<String>,
    timestamp: DateTime<Utc>,
  ) -> Result<Self> {
    Ok(Self {
      kind: T::COLLECTION.save_event(),
      timestamp,
      executed_by: executed_by.into(),
      data: serde_json::to_value(record)?,
    })
  }

  pub fn deleted(
    collection: Collection,
    id: &str,
    executed_by: impl Into<String>,
    timestamp: DateTime<Utc>,
  ) -> Self {
    Self {
      kind: collection.delete_event(),
      timestamp,
      executed_by: executed_by.into(),
      data: json!({ "id": id }),
    }
  }

  pub fn config_saved(
    config: &CloudConfig,
    executed_by: impl Into<String>,
    timestamp: DateTime<Utc>,
  ) -> Result<Self> {
    Ok(Self {
      kind: EventType::SaveConfig,
      timestamp,
      executed_by: executed_by.into(),
      data: serde_json::to_value(config)?,
    })
  }

  /// The `id` carried by a deletion payload.
  pub fn deleted_id(&self) -> Option<&str> {
    self.data.get("id").and_then(serde_json::Value::as_str)
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The full remote state. An absent key means "no data for this
/// collection", never "empty collection".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub users:   Option<Vec<User>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub studies: Option<Vec<BibleStudy>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub classes: Option<Vec<BibleClass>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub groups:  Option<Vec<SmallGroup>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub visits:  Option<Vec<StaffVisit>>,
}

impl Snapshot {
  /// Collections this snapshot carries, in application order.
  pub fn present(&self) -> Vec<Collection> {
    [
      (self.users.is_some(), Collection::Users),
      (self.studies.is_some(), Collection::Studies),
      (self.classes.is_some(), Collection::Classes),
      (self.groups.is_some(), Collection::Groups),
      (self.visits.is_some(), Collection::Visits),
    ]
    .into_iter()
    .filter_map(|(present, c)| present.then_some(c))
    .collect()
  }
}
