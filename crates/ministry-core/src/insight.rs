//! The insight collaborator: prose generated from a summary of the logged
//! activity.
//!
//! Generation itself happens elsewhere, behind [`InsightProvider`]. This
//! module builds the summary text, honours the operator's broadcast message,
//! and caches the last successful result across sessions.

use std::{fmt, future::Future};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
  activity::{BibleClass, BibleStudy, SmallGroup, StaffVisit},
  storage::{Storage, StorageKey},
  store::RecordStore,
};

/// Returned whenever generation fails.
pub const FALLBACK_INSIGHT: &str =
  "Keep logging your visits and studies; insights will appear once the \
   service is reachable.";

/// Something that turns a data summary into prose.
pub trait InsightProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn generate(
    &self,
    summary: &str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// The last successful insight, persisted under
/// [`StorageKey::InsightCache`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedInsight {
  pub text:         String,
  pub generated_at: DateTime<Utc>,
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Activity counts for one month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivitySummary {
  pub year:         i32,
  pub month:        u32,
  pub studies:      usize,
  pub completed:    usize,
  pub classes:      usize,
  pub students:     usize,
  pub groups:       usize,
  pub participants: u64,
  pub visits:       usize,
  pub follow_ups:   usize,
}

impl ActivitySummary {
  pub fn for_month(
    year: i32,
    month: u32,
    studies: &[BibleStudy],
    classes: &[BibleClass],
    groups: &[SmallGroup],
    visits: &[StaffVisit],
  ) -> Self {
    let in_month = |y: i32, m: u32| y == year && m == month;

    let studies: Vec<_> = studies.iter().filter(|s| in_month(s.year, s.month)).collect();
    let classes: Vec<_> = classes.iter().filter(|c| in_month(c.year, c.month)).collect();
    let groups: Vec<_> = groups.iter().filter(|g| in_month(g.year, g.month)).collect();
    let visits: Vec<_> = visits.iter().filter(|v| in_month(v.year, v.month)).collect();

    Self {
      year,
      month,
      studies: studies.len(),
      completed: studies
        .iter()
        .filter(|s| s.status == crate::activity::StudyStatus::Completion)
        .count(),
      classes: classes.len(),
      students: classes.iter().map(|c| c.students.len()).sum(),
      groups: groups.len(),
      participants: groups.iter().map(|g| u64::from(g.participants_count)).sum(),
      visits: visits.len(),
      follow_ups: visits.iter().filter(|v| v.needs_follow_up).count(),
    }
  }
}

impl fmt::Display for ActivitySummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Period: {:04}-{:02}", self.year, self.month)?;
    writeln!(f, "Bible studies: {} ({} completed)", self.studies, self.completed)?;
    writeln!(f, "Bible classes: {} ({} attendances)", self.classes, self.students)?;
    writeln!(f, "Small groups: {} ({} participants)", self.groups, self.participants)?;
    write!(f, "Staff visits: {} ({} need follow-up)", self.visits, self.follow_ups)
  }
}

// ─── Store integration ───────────────────────────────────────────────────────

impl<S: Storage> RecordStore<S> {
  /// The text to show for `summary`: the configured broadcast message if
  /// there is one, otherwise a freshly generated insight, otherwise
  /// [`FALLBACK_INSIGHT`].
  pub async fn insight<P: InsightProvider>(&self, provider: &P, summary: &str) -> String {
    let config = self.config().await;
    if let Some(message) = config.broadcast() {
      return message.to_owned();
    }

    match provider.generate(summary).await {
      Ok(text) => {
        let cached = CachedInsight { text, generated_at: self.clock().now() };
        if let Err(e) = self.write_value(StorageKey::InsightCache, &cached).await {
          warn!(error = %e, "could not cache insight");
        }
        cached.text
      }
      Err(e) => {
        warn!(error = %e, "insight generation failed");
        FALLBACK_INSIGHT.to_owned()
      }
    }
  }

  /// The last successfully generated insight, if any.
  pub async fn cached_insight(&self) -> Option<CachedInsight> {
    self.read_value(StorageKey::InsightCache).await
  }
}
