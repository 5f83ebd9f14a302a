//! The [`Record`] trait shared by every collection entity.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{Display, EnumIter, EnumString};

use crate::{ValidationError, storage::StorageKey, wire::EventType};

// ─── Collections ─────────────────────────────────────────────────────────────

/// The typed collections held by the record store.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Collection {
  Studies,
  Classes,
  Groups,
  Visits,
  Users,
  ChangeRequests,
}

impl Collection {
  pub fn storage_key(self) -> StorageKey {
    match self {
      Self::Studies => StorageKey::Studies,
      Self::Classes => StorageKey::Classes,
      Self::Groups => StorageKey::Groups,
      Self::Visits => StorageKey::Visits,
      Self::Users => StorageKey::Users,
      Self::ChangeRequests => StorageKey::ChangeRequests,
    }
  }

  /// Event tag pushed to the remote after a save into this collection.
  pub fn save_event(self) -> EventType {
    match self {
      Self::Studies => EventType::SaveStudy,
      Self::Classes => EventType::SaveClass,
      Self::Groups => EventType::SaveGroup,
      Self::Visits => EventType::SaveVisit,
      Self::Users => EventType::SaveUser,
      Self::ChangeRequests => EventType::SaveChangeRequest,
    }
  }

  /// Event tag pushed to the remote after a delete from this collection.
  pub fn delete_event(self) -> EventType {
    match self {
      Self::Studies => EventType::DeleteStudy,
      Self::Classes => EventType::DeleteClass,
      Self::Groups => EventType::DeleteGroup,
      Self::Visits => EventType::DeleteVisit,
      Self::Users => EventType::DeleteUser,
      Self::ChangeRequests => EventType::DeleteChangeRequest,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// An entity stored in one of the [`Collection`]s, identified by an opaque
/// string id unique within that collection.
pub trait Record:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  const COLLECTION: Collection;

  fn id(&self) -> &str;

  fn set_id(&mut self, id: String);

  /// Reject records missing required data. Called before anything is
  /// persisted.
  fn validate(&self) -> Result<(), ValidationError>;

  /// Recompute fields that are pure functions of other fields.
  fn derive(&mut self) {}

  /// Fill derived fields and carry immutable ones over from the stored
  /// version (`previous`), if there is one.
  fn normalize(&mut self, _previous: Option<&Self>, _now: DateTime<Utc>) { self.derive(); }

  /// The user id that owns this record, if ownership applies.
  fn owner(&self) -> Option<&str> { None }
}

// ─── Shared helpers ──────────────────────────────────────────────────────────

/// `(year, month)` of an activity date.
pub fn period(date: NaiveDate) -> (i32, u32) { (date.year(), date.month()) }

/// The creation stamp a saved record must carry: the stored one if present,
/// else whatever the caller supplied, else `now`.
pub(crate) fn creation_stamp(
  previous: Option<DateTime<Utc>>,
  supplied: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> DateTime<Utc> {
  previous.or(supplied).unwrap_or(now)
}
