//! Session extractor and password hashing.
//!
//! The extractor is the middleware boundary: any handler that takes a
//! [`Session`] argument cannot run without a verified token, so
//! authentication strictly precedes every ledger mutation.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use rand_core::OsRng;
use tether_core::store::SocialStore;
use uuid::Uuid;

use crate::{AppState, error::Error, session::AuthError};

/// Name of the cookie the login handler sets.
pub const SESSION_COOKIE: &str = "session";

/// Present in a handler signature means the request carried a valid session;
/// the inner value is the authenticated user id.
pub struct Session(pub Uuid);

/// Pull a bearer token out of the request headers: `Authorization: Bearer`
/// first, then the `session` cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
  if let Some(value) = headers.get(header::AUTHORIZATION)
    && let Ok(value) = value.to_str()
    && let Some(token) = value.strip_prefix("Bearer ")
  {
    return Some(token.trim().to_string());
  }

  let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
  cookies.split(';').find_map(|pair| {
    let (name, value) = pair.trim().split_once('=')?;
    (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
  })
}

impl<S> FromRequestParts<AppState<S>> for Session
where
  S: SocialStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token =
      token_from_headers(&parts.headers).ok_or(AuthError::Missing)?;
    let user_id = state.sessions.verify(&token)?;
    Ok(Session(user_id))
  }
}

// ─── Password hashing ────────────────────────────────────────────────────────

/// Hash a plaintext password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
}

/// Verify a plaintext password against a stored PHC string. The hash never
/// leaves this function.
pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}
