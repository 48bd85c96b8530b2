//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Statuses are stored as their lowercase wire
//! names, the same spelling the HTTP layer accepts in paths.

use chrono::{DateTime, Utc};
use tether_core::{
  connection::{ConnectionRequest, ConnectionStatus, PairKey},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ConnectionStatus
// ─────────────────────────────────────────────────────────

pub fn encode_status(s: ConnectionStatus) -> &'static str {
  match s {
    ConnectionStatus::Interested => "interested",
    ConnectionStatus::Ignored => "ignored",
    ConnectionStatus::Accepted => "accepted",
    ConnectionStatus::Rejected => "rejected",
  }
}

pub fn decode_status(s: &str) -> Result<ConnectionStatus> {
  match s {
    "interested" => Ok(ConnectionStatus::Interested),
    "ignored" => Ok(ConnectionStatus::Ignored),
    "accepted" => Ok(ConnectionStatus::Accepted),
    "rejected" => Ok(ConnectionStatus::Rejected),
    other => Err(tether_core::Error::UnknownStatus(other.to_string()).into()),
  }
}

// ─── PairKey ─────────────────────────────────────────────────────────────────

/// Canonical column value: `lo:hi` with both ids hyphenated lowercase.
pub fn encode_pair_key(pair: PairKey) -> String {
  format!("{}:{}", encode_uuid(pair.lo()), encode_uuid(pair.hi()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub email:      String,
  pub first_name: String,
  pub last_name:  String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      email:      self.email,
      first_name: self.first_name,
      last_name:  self.last_name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `connection_requests` row.
pub struct RawRequest {
  pub request_id:   String,
  pub from_user_id: String,
  pub to_user_id:   String,
  pub status:       String,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawRequest {
  pub fn into_request(self) -> Result<ConnectionRequest> {
    Ok(ConnectionRequest {
      request_id: decode_uuid(&self.request_id)?,
      from_user:  decode_uuid(&self.from_user_id)?,
      to_user:    decode_uuid(&self.to_user_id)?,
      status:     decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
