//! Connection requests — the single status record the ledger keeps per
//! unordered pair of users.
//!
//! Direction (`from_user` / `to_user`) records who initiated the *current*
//! status, not a fixed requester/requestee role: a resend from the other
//! side overwrites `status` in place and leaves the direction fields alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Every state a relationship record can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
  Interested,
  Ignored,
  Accepted,
  Rejected,
}

/// The statuses a sender may set directly. `accepted`/`rejected` only arise
/// from review, so they are unrepresentable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
  Interested,
  Ignored,
}

impl From<SendStatus> for ConnectionStatus {
  fn from(s: SendStatus) -> Self {
    match s {
      SendStatus::Interested => Self::Interested,
      SendStatus::Ignored => Self::Ignored,
    }
  }
}

/// The verdicts an addressee may hand down on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
  Accepted,
  Rejected,
}

impl From<Decision> for ConnectionStatus {
  fn from(d: Decision) -> Self {
    match d {
      Decision::Accepted => Self::Accepted,
      Decision::Rejected => Self::Rejected,
    }
  }
}

// ─── Pair key ────────────────────────────────────────────────────────────────

/// Canonical order-independent key over two distinct user ids.
///
/// `PairKey::new(a, b) == PairKey::new(b, a)`; construction fails when
/// `a == b`, so a self-relationship is unrepresentable downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
  lo: Uuid,
  hi: Uuid,
}

impl PairKey {
  pub fn new(a: Uuid, b: Uuid) -> Result<Self> {
    if a == b {
      return Err(Error::SelfReference);
    }
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    Ok(Self { lo, hi })
  }

  pub fn lo(&self) -> Uuid { self.lo }

  pub fn hi(&self) -> Uuid { self.hi }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// The stored relationship record — at most one per unordered user pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRequest {
  pub request_id: Uuid,
  /// Who initiated the current status.
  pub from_user:  Uuid,
  /// The addressee — the only party allowed to review while `interested`.
  pub to_user:    Uuid,
  pub status:     ConnectionStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// What an upsert of a send status did to the pair's record.
#[derive(Debug, Clone)]
pub enum SendOutcome {
  /// No record existed for the pair; one was created.
  Created(ConnectionRequest),
  /// A record existed with a different status; its status was overwritten.
  Updated(ConnectionRequest),
  /// A record existed with the same status; nothing changed.
  Unchanged(ConnectionRequest),
}

impl SendOutcome {
  pub fn record(&self) -> &ConnectionRequest {
    match self {
      Self::Created(r) | Self::Updated(r) | Self::Unchanged(r) => r,
    }
  }
}
