//! Users and roles.

use serde::{Deserialize, Serialize};

use crate::{
  ValidationError,
  record::{Collection, Record},
  validate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Admin,
  Chaplain,
  Assistant,
}

/// An account able to log in. The password is stored and compared as
/// plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  #[serde(default)]
  pub id:        String,
  pub name:      String,
  /// Login key; compared case-insensitively.
  pub email:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub password:  Option<String>,
  pub role:      Role,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo_url: Option<String>,
}

impl User {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }

  /// The account seeded on first run.
  pub fn default_admin() -> Self {
    Self {
      id:        "admin".to_owned(),
      name:      "Administrator".to_owned(),
      email:     "admin@ministry.local".to_owned(),
      password:  Some("admin".to_owned()),
      role:      Role::Admin,
      photo_url: None,
    }
  }

  /// Exact comparison; an account without a password (or with an empty one)
  /// accepts only an empty password.
  pub fn password_matches(&self, supplied: &str) -> bool {
    self.password.as_deref().unwrap_or_default() == supplied
  }
}

impl Record for User {
  const COLLECTION: Collection = Collection::Users;

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn validate(&self) -> Result<(), ValidationError> {
    validate::required("name", &self.name)?;
    validate::email(&self.email)
  }

  /// A user owns their own account record.
  fn owner(&self) -> Option<&str> { Some(&self.id) }
}
