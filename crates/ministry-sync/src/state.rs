//! [`SyncState`] — the write-suppression lock.
//!
//! After a push the remote is only eventually consistent, so a pull issued
//! right away could read the pre-write snapshot and clobber the local
//! change. Every push stamps `last_write_at`; pulls inside the window are
//! skipped. Concurrent writers on other clients can still race.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use ministry_core::clock::Clock;

/// Length of the window, in seconds, when not configured.
pub const DEFAULT_LOCK_WINDOW_SECS: i64 = 8;

pub struct SyncState {
  clock:         Arc<dyn Clock>,
  window:        TimeDelta,
  last_write_at: Mutex<Option<DateTime<Utc>>>,
}

impl SyncState {
  pub fn new(clock: Arc<dyn Clock>, window: TimeDelta) -> Self {
    Self { clock, window, last_write_at: Mutex::new(None) }
  }

  pub fn window(&self) -> TimeDelta { self.window }

  pub fn now(&self) -> DateTime<Utc> { self.clock.now() }

  /// Stamp a local write at the current instant and return it.
  pub fn record_write(&self) -> DateTime<Utc> {
    let now = self.clock.now();
    *self.last_write_at.lock().unwrap_or_else(PoisonError::into_inner) = Some(now);
    now
  }

  pub fn last_write_at(&self) -> Option<DateTime<Utc>> {
    *self.last_write_at.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Time since the last write, if that write is still inside the window.
  pub fn locked_for(&self) -> Option<TimeDelta> {
    let last = self.last_write_at()?;
    let elapsed = self.clock.now() - last;
    (elapsed < self.window).then_some(elapsed)
  }
}
