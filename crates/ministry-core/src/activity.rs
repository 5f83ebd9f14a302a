//! Activity records — the four kinds of pastoral work that get logged.
//!
//! All four share a temporal shape: a `date` from which `year`/`month` are
//! derived on save, a `sector`, the owning `chaplain_id`, and an immutable
//! `created_at`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  ValidationError,
  record::{Collection, Record, creation_stamp, period},
  validate,
};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Where a one-on-one study stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StudyStatus {
  #[default]
  Start,
  Continuation,
  Completion,
}

/// The part of the day a small group meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shift {
  #[default]
  Morning,
  Afternoon,
  Evening,
}

// ─── BibleStudy ──────────────────────────────────────────────────────────────

/// A one-on-one study with a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleStudy {
  #[serde(default)]
  pub id:           String,
  pub date:         NaiveDate,
  #[serde(default)]
  pub year:         i32,
  #[serde(default)]
  pub month:        u32,
  pub sector:       String,
  pub patient_name: String,
  /// Contact number; validated only when present.
  #[serde(default)]
  pub whatsapp:     Option<String>,
  #[serde(default)]
  pub status:       StudyStatus,
  pub study_guide:  String,
  #[serde(default)]
  pub lesson:       String,
  #[serde(default)]
  pub observations: String,
  pub chaplain_id:  String,
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub created_at:   Option<DateTime<Utc>>,
}

impl Record for BibleStudy {
  const COLLECTION: Collection = Collection::Studies;

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn validate(&self) -> Result<(), ValidationError> {
    validate::required("sector", &self.sector)?;
    validate::required("patientName", &self.patient_name)?;
    validate::required("studyGuide", &self.study_guide)?;
    validate::required("chaplainId", &self.chaplain_id)?;
    if let Some(number) = self.whatsapp.as_deref().filter(|n| !n.trim().is_empty()) {
      validate::phone(number)?;
    }
    Ok(())
  }

  fn derive(&mut self) { (self.year, self.month) = period(self.date); }

  fn normalize(&mut self, previous: Option<&Self>, now: DateTime<Utc>) {
    self.derive();
    self.created_at =
      Some(creation_stamp(previous.and_then(|p| p.created_at), self.created_at, now));
    if let Some(p) = previous {
      self.chaplain_id.clone_from(&p.chaplain_id);
    }
  }

  fn owner(&self) -> Option<&str> { Some(&self.chaplain_id) }
}

// ─── BibleClass ──────────────────────────────────────────────────────────────

/// A group study session; attendance is a set of names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleClass {
  #[serde(default)]
  pub id:           String,
  pub date:         NaiveDate,
  #[serde(default)]
  pub year:         i32,
  #[serde(default)]
  pub month:        u32,
  pub sector:       String,
  #[serde(default)]
  pub students:     Vec<String>,
  pub study_guide:  String,
  #[serde(default)]
  pub lesson:       String,
  #[serde(default)]
  pub observations: String,
  pub chaplain_id:  String,
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub created_at:   Option<DateTime<Utc>>,
}

impl Record for BibleClass {
  const COLLECTION: Collection = Collection::Classes;

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn validate(&self) -> Result<(), ValidationError> {
    validate::required("sector", &self.sector)?;
    if self.students.iter().all(|s| s.trim().is_empty()) {
      return Err(ValidationError::NoStudents);
    }
    validate::required("studyGuide", &self.study_guide)?;
    validate::required("chaplainId", &self.chaplain_id)?;
    Ok(())
  }

  fn derive(&mut self) { (self.year, self.month) = period(self.date); }

  fn normalize(&mut self, previous: Option<&Self>, now: DateTime<Utc>) {
    self.derive();
    self.created_at =
      Some(creation_stamp(previous.and_then(|p| p.created_at), self.created_at, now));
    if let Some(p) = previous {
      self.chaplain_id.clone_from(&p.chaplain_id);
    }

    // Attendance is a set: drop blanks and repeated names, keep first order.
    let mut seen = std::collections::HashSet::new();
    self.students = std::mem::take(&mut self.students)
      .into_iter()
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty() && seen.insert(s.clone()))
      .collect();
  }

  fn owner(&self) -> Option<&str> { Some(&self.chaplain_id) }
}

// ─── SmallGroup ──────────────────────────────────────────────────────────────

/// A small-group meeting held in one facility unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmallGroup {
  #[serde(default)]
  pub id:                 String,
  pub date:               NaiveDate,
  #[serde(default)]
  pub year:               i32,
  #[serde(default)]
  pub month:              u32,
  pub sector:             String,
  pub group_name:         String,
  pub leader:             String,
  #[serde(default)]
  pub shift:              Shift,
  pub participants_count: u32,
  /// Facility unit; selects which configured sector/group lists apply.
  pub unit:               String,
  #[serde(default)]
  pub observations:       String,
  pub chaplain_id:        String,
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub created_at:         Option<DateTime<Utc>>,
}

impl Record for SmallGroup {
  const COLLECTION: Collection = Collection::Groups;

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn validate(&self) -> Result<(), ValidationError> {
    validate::required("sector", &self.sector)?;
    validate::required("groupName", &self.group_name)?;
    validate::required("leader", &self.leader)?;
    validate::required("unit", &self.unit)?;
    validate::required("chaplainId", &self.chaplain_id)?;
    if self.participants_count < 1 {
      return Err(ValidationError::NoParticipants);
    }
    Ok(())
  }

  fn derive(&mut self) { (self.year, self.month) = period(self.date); }

  fn normalize(&mut self, previous: Option<&Self>, now: DateTime<Utc>) {
    self.derive();
    self.created_at =
      Some(creation_stamp(previous.and_then(|p| p.created_at), self.created_at, now));
    if let Some(p) = previous {
      self.chaplain_id.clone_from(&p.chaplain_id);
    }
  }

  fn owner(&self) -> Option<&str> { Some(&self.chaplain_id) }
}

// ─── StaffVisit ──────────────────────────────────────────────────────────────

/// A pastoral visit to a member of staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffVisit {
  #[serde(default)]
  pub id:              String,
  pub date:            NaiveDate,
  #[serde(default)]
  pub year:            i32,
  #[serde(default)]
  pub month:           u32,
  pub sector:          String,
  pub staff_name:      String,
  pub reason:          String,
  #[serde(default)]
  pub needs_follow_up: bool,
  #[serde(default)]
  pub observations:    String,
  pub chaplain_id:     String,
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub created_at:      Option<DateTime<Utc>>,
}

impl Record for StaffVisit {
  const COLLECTION: Collection = Collection::Visits;

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn validate(&self) -> Result<(), ValidationError> {
    validate::required("sector", &self.sector)?;
    validate::required("staffName", &self.staff_name)?;
    validate::required("reason", &self.reason)?;
    validate::required("chaplainId", &self.chaplain_id)?;
    Ok(())
  }

  fn derive(&mut self) { (self.year, self.month) = period(self.date); }

  fn normalize(&mut self, previous: Option<&Self>, now: DateTime<Utc>) {
    self.derive();
    self.created_at =
      Some(creation_stamp(previous.and_then(|p| p.created_at), self.created_at, now));
    if let Some(p) = previous {
      self.chaplain_id.clone_from(&p.chaplain_id);
    }
  }

  fn owner(&self) -> Option<&str> { Some(&self.chaplain_id) }
}
