//! Handlers for the relationship ledger endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/requests/send/{status}/{to_user_id}` | `status` ∈ `interested`/`ignored` |
//! | `POST` | `/requests/review/{decision}/{request_id}` | `decision` ∈ `accepted`/`rejected` |
//! | `GET`  | `/requests/pending` | `interested` requests addressed to the caller |
//! | `GET`  | `/connections` | accepted connections of the caller |
//!
//! Every route requires a valid session; the [`Session`] extractor rejects
//! unauthenticated requests before any handler body runs. Status and
//! decision segments decode into their typed subsets, so an out-of-range
//! value is a 400 before this module is ever invoked.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use tether_core::{
  connection::{ConnectionRequest, Decision, SendOutcome, SendStatus},
  store::SocialStore,
};
use uuid::Uuid;

use crate::{AppState, auth::Session, error::Error};

// ─── Send ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SendResponse {
  pub message: String,
  pub request: ConnectionRequest,
}

/// `POST /requests/send/{status}/{to_user_id}`
pub async fn send<S>(
  State(state): State<AppState<S>>,
  Session(actor): Session,
  Path((status, to_user_id)): Path<(SendStatus, Uuid)>,
) -> Result<impl IntoResponse, Error>
where
  S: SocialStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if actor == to_user_id {
    return Err(Error::BadRequest(
      "you cannot send a request to yourself".into(),
    ));
  }

  let target = state
    .store
    .get_user(to_user_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if target.is_none() {
    return Err(Error::NotFound("user does not exist".into()));
  }

  let outcome = state
    .store
    .upsert_request(actor, to_user_id, status)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let (code, message, request) = match outcome {
    SendOutcome::Created(r) => {
      (StatusCode::CREATED, "connection request sent", r)
    }
    SendOutcome::Updated(r) => {
      (StatusCode::OK, "connection request status updated", r)
    }
    SendOutcome::Unchanged(r) => (
      StatusCode::OK,
      "connection request already has this status",
      r,
    ),
  };

  Ok((
    code,
    Json(SendResponse { message: message.to_string(), request }),
  ))
}

// ─── Review ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
  pub message: String,
  pub request: ConnectionRequest,
}

/// `POST /requests/review/{decision}/{request_id}`
///
/// A miss is a uniform 404: callers cannot tell "no such request" from
/// "exists but you are not the addressee" or "no longer pending".
pub async fn review<S>(
  State(state): State<AppState<S>>,
  Session(actor): Session,
  Path((decision, request_id)): Path<(Decision, Uuid)>,
) -> Result<impl IntoResponse, Error>
where
  S: SocialStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let reviewed = state
    .store
    .review_request(actor, request_id, decision)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or_else(|| {
      Error::NotFound("no matching pending request".into())
    })?;

  Ok(Json(ReviewResponse {
    message: format!(
      "request marked '{}'",
      match decision {
        Decision::Accepted => "accepted",
        Decision::Rejected => "rejected",
      }
    ),
    request: reviewed,
  }))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /requests/pending`
pub async fn pending<S>(
  State(state): State<AppState<S>>,
  Session(user): Session,
) -> Result<Json<Vec<ConnectionRequest>>, Error>
where
  S: SocialStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let requests = state
    .store
    .list_pending_for(user)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(requests))
}

/// `GET /connections`
pub async fn connections<S>(
  State(state): State<AppState<S>>,
  Session(user): Session,
) -> Result<Json<Vec<ConnectionRequest>>, Error>
where
  S: SocialStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let records = state
    .store
    .list_connections_of(user)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(records))
}
