//! HTTP layer for the Tether connection-request backend.
//!
//! Exposes an axum [`Router`] backed by any [`SocialStore`]. Sessions are
//! signed JWTs minted on login and checked by the [`auth::Session`]
//! extractor before any ledger handler runs.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod requests;
pub mod session;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tether_core::store::SocialStore;

use session::SessionIssuer;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_session_ttl_days() -> i64 { 7 }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// HMAC secret for session tokens. Injected here rather than read from a
  /// global so each environment (and each test) brings its own key.
  pub session_secret: String,
  #[serde(default = "default_session_ttl_days")]
  pub session_ttl_days: i64,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SocialStore> {
  pub store:    Arc<S>,
  pub sessions: Arc<SessionIssuer>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the backend.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SocialStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Accounts
    .route("/auth/signup", post(accounts::signup::<S>))
    .route("/auth/login", post(accounts::login::<S>))
    .route("/auth/logout", post(accounts::logout::<S>))
    // Relationship ledger
    .route(
      "/requests/send/{status}/{to_user_id}",
      post(requests::send::<S>),
    )
    .route(
      "/requests/review/{decision}/{request_id}",
      post(requests::review::<S>),
    )
    .route("/requests/pending", get(requests::pending::<S>))
    .route("/connections", get(requests::connections::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::Duration;
  use serde_json::{Value, json};
  use tether_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  const TEST_SECRET: &[u8] = b"test-signing-secret";

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:    Arc::new(store),
      sessions: Arc::new(SessionIssuer::new(TEST_SECRET, Duration::days(7))),
    }
  }

  async fn request(
    state:  AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string())),
      None => builder.body(Body::empty()),
    }
    .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn signup_body(email: &str) -> Value {
    json!({
      "email": email,
      "password": "s3cret-pw!",
      "first_name": "Test",
      "last_name": "User",
    })
  }

  /// Sign up and log in; returns `(user_id, token)`.
  async fn account(state: &AppState<SqliteStore>, email: &str) -> (Uuid, String) {
    let resp = request(
      state.clone(), "POST", "/auth/signup", None, Some(signup_body(email)),
    ).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user = json_body(resp).await;
    let user_id: Uuid = user["user_id"].as_str().unwrap().parse().unwrap();

    let resp = request(
      state.clone(), "POST", "/auth/login", None,
      Some(json!({ "email": email, "password": "s3cret-pw!" })),
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    (user_id, body["token"].as_str().unwrap().to_string())
  }

  // ── Accounts ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn signup_and_login_round_trip() {
    let state = make_state().await;

    let resp = request(
      state.clone(), "POST", "/auth/signup", None,
      Some(signup_body("alice@example.com")),
    ).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user = json_body(resp).await;
    assert_eq!(user["email"], "alice@example.com");
    // The password hash must never appear in a response.
    assert!(user.get("password_hash").is_none());

    let resp = request(
      state, "POST", "/auth/login", None,
      Some(json!({ "email": "alice@example.com", "password": "s3cret-pw!" })),
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
      .headers()
      .get(header::SET_COOKIE)
      .unwrap()
      .to_str()
      .unwrap()
      .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
    let body = json_body(resp).await;
    assert!(body["token"].as_str().is_some());
  }

  #[tokio::test]
  async fn login_failures_are_indistinguishable() {
    let state = make_state().await;
    account(&state, "bob@example.com").await;

    let wrong_pw = request(
      state.clone(), "POST", "/auth/login", None,
      Some(json!({ "email": "bob@example.com", "password": "nope" })),
    ).await;
    let no_user = request(
      state, "POST", "/auth/login", None,
      Some(json!({ "email": "ghost@example.com", "password": "nope" })),
    ).await;

    assert_eq!(wrong_pw.status(), StatusCode::BAD_REQUEST);
    assert_eq!(no_user.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(wrong_pw).await, json_body(no_user).await);
  }

  #[tokio::test]
  async fn duplicate_signup_is_rejected() {
    let state = make_state().await;
    account(&state, "carol@example.com").await;

    let resp = request(
      state, "POST", "/auth/signup", None,
      Some(signup_body("carol@example.com")),
    ).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn logout_expires_the_cookie() {
    let state = make_state().await;
    let (_, token) = account(&state, "dave@example.com").await;

    let resp = request(state, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
      .headers()
      .get(header::SET_COOKIE)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(cookie.contains("Max-Age=0"), "cookie: {cookie}");
  }

  // ── Session enforcement ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn ledger_routes_require_a_session() {
    let state = make_state().await;
    let target = Uuid::new_v4();

    let resp = request(
      state.clone(), "POST",
      &format!("/requests/send/interested/{target}"),
      None, None,
    ).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = request(state, "GET", "/requests/pending", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn expired_session_is_rejected_as_expired() {
    let state = make_state().await;
    let (user_id, _) = account(&state, "eve@example.com").await;

    // Same secret, negative TTL: a structurally valid but expired token.
    let stale =
      SessionIssuer::new(TEST_SECRET, Duration::seconds(-10));
    let token = stale.issue(user_id).unwrap();

    let resp = request(
      state, "GET", "/requests/pending", Some(&token), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "session token has expired");
  }

  #[tokio::test]
  async fn forged_session_is_rejected() {
    let state = make_state().await;
    let (user_id, _) = account(&state, "mallory@example.com").await;

    let forger = SessionIssuer::new(b"attacker-secret", Duration::days(7));
    let token = forger.issue(user_id).unwrap();

    let resp = request(
      state, "GET", "/requests/pending", Some(&token), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Send ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn send_creates_then_counterparty_overwrites() {
    let state = make_state().await;
    let (a, token_a) = account(&state, "a@example.com").await;
    let (b, token_b) = account(&state, "b@example.com").await;

    let resp = request(
      state.clone(), "POST",
      &format!("/requests/send/interested/{b}"),
      Some(&token_a), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    let request_id = created["request"]["request_id"].as_str().unwrap().to_string();

    // B overwrites the pair's status from the other direction.
    let resp = request(
      state.clone(), "POST",
      &format!("/requests/send/ignored/{a}"),
      Some(&token_b), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(updated["message"], "connection request status updated");
    assert_eq!(updated["request"]["request_id"], request_id.as_str());
    assert_eq!(updated["request"]["status"], "ignored");
    // Direction still records the original initiator.
    assert_eq!(updated["request"]["from_user"], a.to_string());
  }

  #[tokio::test]
  async fn resend_with_same_status_reports_unchanged() {
    let state = make_state().await;
    let (_, token_a) = account(&state, "a@example.com").await;
    let (b, _) = account(&state, "b@example.com").await;

    request(
      state.clone(), "POST", &format!("/requests/send/interested/{b}"),
      Some(&token_a), None,
    ).await;
    let resp = request(
      state, "POST", &format!("/requests/send/interested/{b}"),
      Some(&token_a), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "connection request already has this status");
  }

  #[tokio::test]
  async fn self_send_is_a_validation_error() {
    let state = make_state().await;
    let (a, token_a) = account(&state, "a@example.com").await;

    let resp = request(
      state, "POST", &format!("/requests/send/interested/{a}"),
      Some(&token_a), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn send_to_unknown_user_is_not_found() {
    let state = make_state().await;
    let (_, token_a) = account(&state, "a@example.com").await;

    let resp = request(
      state, "POST",
      &format!("/requests/send/interested/{}", Uuid::new_v4()),
      Some(&token_a), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn review_statuses_cannot_be_sent_directly() {
    let state = make_state().await;
    let (_, token_a) = account(&state, "a@example.com").await;
    let (b, _) = account(&state, "b@example.com").await;

    // "accepted" is not a SendStatus; the path segment fails to decode.
    let resp = request(
      state, "POST", &format!("/requests/send/accepted/{b}"),
      Some(&token_a), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Review ───────────────────────────────────────────────────────────────────

  async fn send_interested(
    state: &AppState<SqliteStore>,
    token: &str,
    to:    Uuid,
  ) -> String {
    let resp = request(
      state.clone(), "POST", &format!("/requests/send/interested/{to}"),
      Some(token), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await["request"]["request_id"]
      .as_str()
      .unwrap()
      .to_string()
  }

  #[tokio::test]
  async fn accept_then_second_review_misses() {
    let state = make_state().await;
    let (_, token_a) = account(&state, "a@example.com").await;
    let (b, token_b) = account(&state, "b@example.com").await;

    let request_id = send_interested(&state, &token_a, b).await;

    let resp = request(
      state.clone(), "POST",
      &format!("/requests/review/accepted/{request_id}"),
      Some(&token_b), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["request"]["status"], "accepted");

    // accepted is terminal: a second review finds nothing pending.
    let resp = request(
      state, "POST",
      &format!("/requests/review/rejected/{request_id}"),
      Some(&token_b), None,
    ).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn review_by_non_addressee_is_a_uniform_miss() {
    let state = make_state().await;
    let (_, token_a) = account(&state, "a@example.com").await;
    let (b, _) = account(&state, "b@example.com").await;
    let (_, token_c) = account(&state, "c@example.com").await;

    let request_id = send_interested(&state, &token_a, b).await;

    // C is authenticated but not the addressee; same 404 as a bogus id.
    let by_outsider = request(
      state.clone(), "POST",
      &format!("/requests/review/accepted/{request_id}"),
      Some(&token_c), None,
    ).await;
    let bogus = request(
      state, "POST",
      &format!("/requests/review/accepted/{}", Uuid::new_v4()),
      Some(&token_c), None,
    ).await;

    assert_eq!(by_outsider.status(), StatusCode::NOT_FOUND);
    assert_eq!(bogus.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(by_outsider).await, json_body(bogus).await);
  }

  // ── Reads ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn pending_and_connections_reflect_the_ledger() {
    let state = make_state().await;
    let (a, token_a) = account(&state, "a@example.com").await;
    let (b, token_b) = account(&state, "b@example.com").await;
    let (_, token_c) = account(&state, "c@example.com").await;

    let from_a = send_interested(&state, &token_a, b).await;
    send_interested(&state, &token_c, b).await;

    let resp = request(
      state.clone(), "GET", "/requests/pending", Some(&token_b), None,
    ).await;
    let pending = json_body(resp).await;
    assert_eq!(pending.as_array().unwrap().len(), 2);

    // Accept A's request only.
    request(
      state.clone(), "POST",
      &format!("/requests/review/accepted/{from_a}"),
      Some(&token_b), None,
    ).await;

    let resp = request(
      state.clone(), "GET", "/connections", Some(&token_b), None,
    ).await;
    let of_b = json_body(resp).await;
    assert_eq!(of_b.as_array().unwrap().len(), 1);
    assert_eq!(of_b[0]["from_user"], a.to_string());

    // A sees the same connection from their side; C has none yet.
    let resp = request(
      state.clone(), "GET", "/connections", Some(&token_a), None,
    ).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);

    let resp = request(state, "GET", "/connections", Some(&token_c), None).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 0);
  }
}
