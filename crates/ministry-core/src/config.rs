//! Tenant configuration — a singleton synchronised alongside the
//! collections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Endpoint used when no configuration has ever been saved.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5290/exec";

/// Customisable pick-lists for one facility unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitLists {
  #[serde(default)]
  pub sectors: Vec<String>,
  #[serde(default)]
  pub groups:  Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudConfig {
  /// The remote endpoint pulls and pushes go to.
  pub database_url:      String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub spreadsheet_id:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub app_logo:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub report_logo:       Option<String>,
  /// Pick-lists keyed by facility-unit tag.
  #[serde(default)]
  pub units:             BTreeMap<String, UnitLists>,
  /// Operator-authored message shown instead of a generated insight.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub broadcast_message: Option<String>,
}

impl CloudConfig {
  /// A blank configuration pointing at `endpoint`.
  pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
    Self {
      database_url:      endpoint.into(),
      spreadsheet_id:    None,
      app_logo:          None,
      report_logo:       None,
      units:             BTreeMap::new(),
      broadcast_message: None,
    }
  }

  /// The lists configured for `unit`, or empty ones.
  pub fn lists_for(&self, unit: &str) -> UnitLists {
    self.units.get(unit).cloned().unwrap_or_default()
  }

  /// The broadcast message, if one is set and non-blank.
  pub fn broadcast(&self) -> Option<&str> {
    self.broadcast_message.as_deref().filter(|m| !m.trim().is_empty())
  }
}

impl Default for CloudConfig {
  fn default() -> Self { Self::with_endpoint(DEFAULT_ENDPOINT) }
}
