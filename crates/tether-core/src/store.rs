//! The `SocialStore` trait — the persistence seam for users and the
//! relationship ledger.
//!
//! The trait is implemented by storage backends (e.g. `tether-store-sqlite`).
//! The server depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  connection::{ConnectionRequest, Decision, PairKey, SendOutcome, SendStatus},
  user::{NewUser, User, UserRecord},
};

/// Abstraction over a Tether storage backend.
///
/// The ledger methods (`upsert_request`, `review_request`) must be atomic
/// with respect to the pair key: concurrent calls for the same unordered
/// pair behave as if executed in some serial order, and at most one record
/// ever exists per pair.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SocialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new account. Returns `None` without writing when
  /// the email already has an account; the uniqueness check and the insert
  /// are atomic, so two racing signups yield exactly one `Some`.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Credential lookup for login. The returned record carries the stored
  /// password hash; it must never leave the login path.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + 'a;

  // ── Relationship ledger ───────────────────────────────────────────────

  /// Apply a sender-initiated status to the pair `{actor, target}`.
  ///
  /// Exactly one of three things happens, atomically:
  /// - no record for the pair → create one with `from_user = actor`;
  /// - a record exists with the same status → no-op ([`SendOutcome::Unchanged`]);
  /// - a record exists with a different status → overwrite `status` and
  ///   `updated_at` in place, leaving the direction fields untouched.
  fn upsert_request(
    &self,
    actor: Uuid,
    target: Uuid,
    status: SendStatus,
  ) -> impl Future<Output = Result<SendOutcome, Self::Error>> + Send + '_;

  /// Retrieve a request by id. Returns `None` if not found.
  fn get_request(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ConnectionRequest>, Self::Error>> + Send + '_;

  /// Retrieve the record for an unordered pair, whichever direction it was
  /// stored in. Returns `None` if the pair has no record.
  fn find_by_pair(
    &self,
    pair: PairKey,
  ) -> impl Future<Output = Result<Option<ConnectionRequest>, Self::Error>> + Send + '_;

  /// Resolve a pending request: overwrite its status with `decision` iff the
  /// record exists, `actor` is its stored `to_user`, and its status is still
  /// `interested`.
  ///
  /// Returns `None` when any of those conditions fails — callers cannot
  /// distinguish "no such request" from "not yours to review".
  fn review_request(
    &self,
    actor: Uuid,
    request_id: Uuid,
    decision: Decision,
  ) -> impl Future<Output = Result<Option<ConnectionRequest>, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All `interested` requests addressed to `user`, newest first.
  fn list_pending_for(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<ConnectionRequest>, Self::Error>> + Send + '_;

  /// All `accepted` records `user` participates in, either direction.
  fn list_connections_of(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<ConnectionRequest>, Self::Error>> + Send + '_;
}
