//! Server error type and [`axum::response::IntoResponse`] implementation.
//!
//! Two deliberate blur points: `InvalidCredentials` is one message for both
//! unknown email and wrong password, and review misses surface as a plain
//! 404 whether the request is absent or simply not the caller's to review.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::session::AuthError;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Auth(#[from] AuthError),

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("token error: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Auth(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
      Error::InvalidCredentials => {
        (StatusCode::BAD_REQUEST, "invalid credentials".to_string())
      }
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      Error::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      Error::Token(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      Error::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
      Error::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
