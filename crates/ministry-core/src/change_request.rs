//! Approval workflow for changes a chaplain may not make directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  ValidationError,
  record::{Collection, Record, creation_stamp},
  validate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

/// A request, raised by a chaplain, for an administrator to change or remove
/// one of their records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
  #[serde(default)]
  pub id:             String,
  pub chaplain_id:    String,
  #[serde(default)]
  pub requester_name: String,
  pub collection:     Collection,
  pub record_id:      String,
  pub description:    String,
  #[serde(default)]
  pub status:         RequestStatus,
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub created_at:     Option<DateTime<Utc>>,
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub resolved_at:    Option<DateTime<Utc>>,
}

impl Record for ChangeRequest {
  const COLLECTION: Collection = Collection::ChangeRequests;

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn validate(&self) -> Result<(), ValidationError> {
    validate::required("chaplainId", &self.chaplain_id)?;
    validate::required("recordId", &self.record_id)?;
    validate::required("description", &self.description)
  }

  fn normalize(&mut self, previous: Option<&Self>, now: DateTime<Utc>) {
    self.created_at =
      Some(creation_stamp(previous.and_then(|p| p.created_at), self.created_at, now));
    if let Some(p) = previous {
      self.chaplain_id.clone_from(&p.chaplain_id);
    }
    match self.status {
      RequestStatus::Pending => self.resolved_at = None,
      _ if self.resolved_at.is_none() => self.resolved_at = Some(now),
      _ => {}
    }
  }

  fn owner(&self) -> Option<&str> { Some(&self.chaplain_id) }
}
