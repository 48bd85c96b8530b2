//! The session issuer — mints and verifies signed, time-bounded session
//! tokens.
//!
//! Tokens are HS256 JWTs carrying `{ sub, iat, exp }`. They are
//! self-contained: verification resolves the subject identity without a
//! database lookup. The signing secret is injected at construction, never
//! read from process-wide state.

use chrono::{Duration, Utc};
use jsonwebtoken::{
  decode, encode, DecodingKey, EncodingKey, Header, Validation,
  errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Why a presented session failed verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
  #[error("no session token presented")]
  Missing,
  #[error("session token is invalid")]
  Invalid,
  #[error("session token has expired")]
  Expired,
}

/// The signed payload embedded in every session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
  /// The authenticated user.
  pub sub: Uuid,
  /// Issued-at, unix seconds.
  pub iat: i64,
  /// Expiry, unix seconds.
  pub exp: i64,
}

/// Sole owner of the signing secret and verification logic.
pub struct SessionIssuer {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl SessionIssuer {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      ttl,
    }
  }

  /// Session lifetime. Exposed so the HTTP layer can set a matching cookie
  /// max-age.
  pub fn ttl(&self) -> Duration { self.ttl }

  /// Mint a token for `user_id`, expiring `ttl` from now. No side effects
  /// beyond token construction.
  pub fn issue(
    &self,
    user_id: Uuid,
  ) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
      sub: user_id,
      iat: now,
      exp: now + self.ttl.num_seconds(),
    };
    encode(&Header::default(), &claims, &self.encoding)
  }

  /// Verify signature and expiry; on success return the embedded subject.
  ///
  /// Expiry is checked with zero leeway: a token is valid strictly until its
  /// `exp` second.
  pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    match decode::<SessionClaims>(token, &self.decoding, &validation) {
      Ok(data) => Ok(data.claims.sub),
      Err(e) => match e.kind() {
        ErrorKind::ExpiredSignature => Err(AuthError::Expired),
        _ => Err(AuthError::Invalid),
      },
    }
  }
}
