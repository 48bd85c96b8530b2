//! User — the account identity the ledger keys relationships on.
//!
//! The ledger itself treats a user id as an opaque comparable key. Profile
//! fields live here because the server needs something to return from signup
//! and login; everything relationship-shaped lives in [`crate::connection`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. Never carries the password hash — that stays inside
/// the store and [`UserRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub email:      String,
  pub first_name: String,
  pub last_name:  String,
  pub created_at: DateTime<Utc>,
}

/// Insert shape for a new account. The caller hashes the password before the
/// store ever sees it.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub password_hash: String,
  pub first_name:    String,
  pub last_name:     String,
}

/// A user plus their stored password hash.
///
/// Returned only by credential lookup during login; the hash must never be
/// serialized into a response.
#[derive(Debug, Clone)]
pub struct UserRecord {
  pub user:          User,
  pub password_hash: String,
}
