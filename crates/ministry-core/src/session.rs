//! Session and configuration gate layered on the [`RecordStore`].
//!
//! ```text
//! ANONYMOUS --login--> AUTHENTICATED --logout--> ANONYMOUS
//! ```
//!
//! The authenticated user is kept under [`StorageKey::CurrentSession`], so a
//! session survives restarts. Sessions never expire.

use tracing::debug;

use crate::{
  Result,
  config::CloudConfig,
  storage::{Storage, StorageKey},
  store::RecordStore,
  user::User,
};

impl<S: Storage> RecordStore<S> {
  /// Match `email` case-insensitively and `password` exactly. On success the
  /// user becomes the current session.
  ///
  /// Unknown email and wrong password are indistinguishable to the caller.
  pub async fn login(&self, email: &str, password: &str) -> Result<Option<User>> {
    let email = email.trim().to_lowercase();
    let matched = self
      .records::<User>()
      .await
      .into_iter()
      .find(|u| {
        u.email.trim().to_lowercase() == email && u.password_matches(password)
      });

    match matched {
      Some(user) => {
        self.set_current_user(&user).await?;
        debug!(user = %user.id, "logged in");
        Ok(Some(user))
      }
      None => Ok(None),
    }
  }

  /// Forget the current session. Collections are left alone.
  pub async fn logout(&self) -> Result<()> {
    self.clear(StorageKey::CurrentSession).await
  }

  /// The persisted session user, if any.
  pub async fn current_user(&self) -> Option<User> {
    self.read_value(StorageKey::CurrentSession).await
  }

  /// Overwrite the session marker.
  pub async fn set_current_user(&self, user: &User) -> Result<()> {
    self.write_value(StorageKey::CurrentSession, user).await
  }

  /// The saved configuration, or a blank one pointing at the default
  /// endpoint if none was ever saved.
  pub async fn config(&self) -> CloudConfig {
    self
      .read_value(StorageKey::Config)
      .await
      .unwrap_or_else(|| CloudConfig::with_endpoint(self.default_endpoint.clone()))
  }

  pub async fn save_config(&self, config: &CloudConfig) -> Result<()> {
    self.write_value(StorageKey::Config, config).await
  }
}
