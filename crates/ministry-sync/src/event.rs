//! Observable outcomes of reconciliation, broadcast to subscribers.

use chrono::{DateTime, TimeDelta, Utc};
use ministry_core::{record::Collection, wire::EventType};

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
  /// A push reached the transport without error.
  Pushed { kind: EventType, at: DateTime<Utc> },
  /// A push was dropped; the remote is now behind local state.
  PushFailed { kind: EventType, error: String },
  /// A pull landed inside the write-suppression window.
  PullSkipped { since_write: TimeDelta },
  /// A pull replaced these collections.
  Pulled { collections: Vec<Collection> },
  /// A pull failed; local state is unchanged.
  PullFailed { error: String },
}
