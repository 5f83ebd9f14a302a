//! Error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid record: {0}")]
  Invalid(#[from] ministry_core::ValidationError),

  #[error("store error: {0}")]
  Store(#[source] ministry_core::Error),
}

impl From<ministry_core::Error> for ApiError {
  fn from(e: ministry_core::Error) -> Self {
    match e {
      ministry_core::Error::Validation(v) => ApiError::Invalid(v),
      ministry_core::Error::Serialization(e) => ApiError::BadRequest(e.to_string()),
      other => ApiError::Store(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
