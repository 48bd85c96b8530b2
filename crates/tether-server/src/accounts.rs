//! Handlers for `/auth` endpoints: signup, login, logout.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup` | Body: [`SignupBody`]; returns 201 + the new user |
//! | `POST` | `/auth/login`  | Body: [`LoginBody`]; sets the session cookie |
//! | `POST` | `/auth/logout` | Authenticated; expires the session cookie |

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tether_core::{store::SocialStore, user::{NewUser, User}};

use crate::{
  AppState,
  auth::{self, SESSION_COOKIE, Session},
  error::Error,
};

fn session_cookie(token: &str, max_age_seconds: i64) -> String {
  format!(
    "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_seconds}"
  )
}

// ─── Signup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub email:      String,
  pub password:   String,
  pub first_name: String,
  pub last_name:  String,
}

/// `POST /auth/signup` — returns 201 + the created [`User`].
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SignupBody>,
) -> Result<impl IntoResponse, Error>
where
  S: SocialStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.email.trim().is_empty()
    || body.password.is_empty()
    || body.first_name.trim().is_empty()
    || body.last_name.trim().is_empty()
  {
    return Err(Error::BadRequest("all fields are required".into()));
  }

  let password_hash = auth::hash_password(&body.password)?;
  // Uniqueness is decided inside the store's atomic insert; `None` here is
  // the only duplicate-email signal, racing signups included.
  let user = state
    .store
    .add_user(NewUser {
      email: body.email.trim().to_string(),
      password_hash,
      first_name: body.first_name.trim().to_string(),
      last_name: body.last_name.trim().to_string(),
    })
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or_else(|| Error::BadRequest("email already registered".into()))?;

  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  /// Also delivered as an HttpOnly cookie; the body copy serves
  /// non-browser clients.
  pub token: String,
  pub user:  User,
}

/// `POST /auth/login` — unknown email and wrong password are deliberately
/// indistinguishable to the caller.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, Error>
where
  S: SocialStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(record) = state
    .store
    .find_user_by_email(body.email.trim())
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
  else {
    // An unknown email must pay the same hashing cost as a wrong password,
    // or response timing would reveal whether the account exists.
    let _ = auth::hash_password(&body.password);
    return Err(Error::InvalidCredentials);
  };

  if !auth::verify_password(&body.password, &record.password_hash) {
    return Err(Error::InvalidCredentials);
  }

  let token = state.sessions.issue(record.user.user_id)?;
  let cookie = session_cookie(&token, state.sessions.ttl().num_seconds());

  Ok((
    [(header::SET_COOKIE, cookie)],
    Json(LoginResponse { token, user: record.user }),
  ))
}

// ─── Logout ───────────────────────────────────────────────────────────────────

/// `POST /auth/logout` — client-side invalidation only: the token stays
/// cryptographically valid until expiry, the cookie is simply dropped.
pub async fn logout<S>(
  State(_state): State<AppState<S>>,
  Session(_user): Session,
) -> Result<impl IntoResponse, Error>
where
  S: SocialStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok((
    [(header::SET_COOKIE, session_cookie("", 0))],
    Json(serde_json::json!({ "message": "logout successful" })),
  ))
}
