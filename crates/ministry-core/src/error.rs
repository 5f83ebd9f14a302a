//! Error types for `ministry-core`.

use thiserror::Error;

use crate::record::Collection;

/// A record rejected before it reached the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{0} is required")]
  Required(&'static str),

  #[error("a class needs at least one student")]
  NoStudents,

  #[error("participant count must be at least 1")]
  NoParticipants,

  #[error("malformed phone number: {0:?}")]
  Phone(String),

  #[error("malformed email address: {0:?}")]
  Email(String),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid record: {0}")]
  Validation(#[from] ValidationError),

  #[error("user {actor} may not modify {collection} record {id}")]
  Forbidden {
    actor:      String,
    collection: Collection,
    id:         String,
  },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn storage(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
