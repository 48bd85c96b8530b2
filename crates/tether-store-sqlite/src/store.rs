//! [`SqliteStore`] — the SQLite implementation of [`SocialStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tether_core::{
  connection::{
    ConnectionRequest, ConnectionStatus, Decision, PairKey, SendOutcome,
    SendStatus,
  },
  store::SocialStore,
  user::{NewUser, User, UserRecord},
};

use crate::{
  encode::{
    encode_dt, encode_pair_key, encode_status, encode_uuid, RawRequest,
    RawUser,
  },
  schema::SCHEMA,
  Error, Result,
};

const REQUEST_COLUMNS: &str =
  "request_id, from_user_id, to_user_id, status, created_at, updated_at";

fn request_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRequest> {
  Ok(RawRequest {
    request_id:   row.get(0)?,
    from_user_id: row.get(1)?,
    to_user_id:   row.get(2)?,
    status:       row.get(3)?,
    created_at:   row.get(4)?,
    updated_at:   row.get(5)?,
  })
}

/// What the upsert closure observed, before decoding back into domain types.
enum RawOutcome {
  Created(RawRequest),
  Updated(RawRequest),
  Unchanged(RawRequest),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tether store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are executed one at a time on the connection's worker thread, so a ledger
/// mutation expressed as one `call` closure is atomic with respect to every
/// other call; the UNIQUE index on `pair_key` backstops that at the schema
/// level.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for SqliteStore {
  type Error = Error;

  // ── Users ──────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<Option<User>> {
    let user = User {
      user_id:    Uuid::new_v4(),
      email:      input.email,
      first_name: input.first_name,
      last_name:  input.last_name,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let email    = user.email.clone();
    let hash     = input.password_hash;
    let first    = user.first_name.clone();
    let last     = user.last_name.clone();
    let at_str   = encode_dt(user.created_at);

    // Existence check and insert run in one call, so no other call can
    // interleave between them.
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if taken {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO users (user_id, email, password_hash, first_name, last_name, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, email, hash, first, last, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Ok(None);
    }
    Ok(Some(user))
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, email, first_name, last_name, created_at
             FROM users WHERE user_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawUser {
                user_id:    row.get(0)?,
                email:      row.get(1)?,
                first_name: row.get(2)?,
                last_name:  row.get(3)?,
                created_at: row.get(4)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
    let email = email.to_owned();

    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, email, first_name, last_name, created_at, password_hash
             FROM users WHERE email = ?1",
            rusqlite::params![email],
            |row| {
              Ok((
                RawUser {
                  user_id:    row.get(0)?,
                  email:      row.get(1)?,
                  first_name: row.get(2)?,
                  last_name:  row.get(3)?,
                  created_at: row.get(4)?,
                },
                row.get(5)?,
              ))
            },
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(raw_user, password_hash)| {
        Ok(UserRecord { user: raw_user.into_user()?, password_hash })
      })
      .transpose()
  }

  // ── Relationship ledger ─────────────────────────────────────────────────────

  async fn upsert_request(
    &self,
    actor:  Uuid,
    target: Uuid,
    status: SendStatus,
  ) -> Result<SendOutcome> {
    let pair = PairKey::new(actor, target)?;

    let now          = Utc::now();
    let new_id_str   = encode_uuid(Uuid::new_v4());
    let pair_str     = encode_pair_key(pair);
    let actor_str    = encode_uuid(actor);
    let target_str   = encode_uuid(target);
    let status_str   = encode_status(ConnectionStatus::from(status)).to_owned();
    let now_str      = encode_dt(now);

    // Lookup and write happen in the same call closure: no other writer can
    // observe the pair between them, and the UNIQUE(pair_key) index would
    // reject a duplicate even if one slipped through.
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {REQUEST_COLUMNS} FROM connection_requests WHERE pair_key = ?1"
        );
        let existing: Option<RawRequest> = conn
          .query_row(&sql, rusqlite::params![pair_str], request_from_row)
          .optional()?;

        match existing {
          None => {
            conn.execute(
              "INSERT INTO connection_requests
                 (request_id, pair_key, from_user_id, to_user_id, status, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
              rusqlite::params![
                new_id_str, pair_str, actor_str, target_str, status_str,
                now_str, now_str,
              ],
            )?;
            Ok(RawOutcome::Created(RawRequest {
              request_id:   new_id_str,
              from_user_id: actor_str,
              to_user_id:   target_str,
              status:       status_str,
              created_at:   now_str.clone(),
              updated_at:   now_str,
            }))
          }
          Some(row) if row.status == status_str => Ok(RawOutcome::Unchanged(row)),
          Some(row) => {
            // Overwrite status in place; the direction fields stay as the
            // original writer left them.
            conn.execute(
              "UPDATE connection_requests SET status = ?1, updated_at = ?2
               WHERE request_id = ?3",
              rusqlite::params![status_str, now_str, row.request_id],
            )?;
            Ok(RawOutcome::Updated(RawRequest {
              status: status_str,
              updated_at: now_str,
              ..row
            }))
          }
        }
      })
      .await?;

    Ok(match raw {
      RawOutcome::Created(r) => SendOutcome::Created(r.into_request()?),
      RawOutcome::Updated(r) => SendOutcome::Updated(r.into_request()?),
      RawOutcome::Unchanged(r) => SendOutcome::Unchanged(r.into_request()?),
    })
  }

  async fn get_request(&self, id: Uuid) -> Result<Option<ConnectionRequest>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {REQUEST_COLUMNS} FROM connection_requests WHERE request_id = ?1"
        );
        Ok(conn
          .query_row(&sql, rusqlite::params![id_str], request_from_row)
          .optional()?)
      })
      .await?;

    raw.map(RawRequest::into_request).transpose()
  }

  async fn find_by_pair(&self, pair: PairKey) -> Result<Option<ConnectionRequest>> {
    let pair_str = encode_pair_key(pair);

    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {REQUEST_COLUMNS} FROM connection_requests WHERE pair_key = ?1"
        );
        Ok(conn
          .query_row(&sql, rusqlite::params![pair_str], request_from_row)
          .optional()?)
      })
      .await?;

    raw.map(RawRequest::into_request).transpose()
  }

  async fn review_request(
    &self,
    actor:      Uuid,
    request_id: Uuid,
    decision:   Decision,
  ) -> Result<Option<ConnectionRequest>> {
    let id_str       = encode_uuid(request_id);
    let actor_str    = encode_uuid(actor);
    let decision_str = encode_status(ConnectionStatus::from(decision)).to_owned();
    let now_str      = encode_dt(Utc::now());

    // One conditional UPDATE carries the whole authorization predicate:
    // the row must exist, be addressed to the actor, and still be pending.
    // Zero affected rows folds all three failures into `None`.
    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE connection_requests SET status = ?1, updated_at = ?2
           WHERE request_id = ?3 AND to_user_id = ?4 AND status = 'interested'",
          rusqlite::params![decision_str, now_str, id_str, actor_str],
        )?;

        if changed == 0 {
          return Ok(None);
        }

        let sql = format!(
          "SELECT {REQUEST_COLUMNS} FROM connection_requests WHERE request_id = ?1"
        );
        Ok(conn
          .query_row(&sql, rusqlite::params![id_str], request_from_row)
          .optional()?)
      })
      .await?;

    raw.map(RawRequest::into_request).transpose()
  }

  // ── Reads ───────────────────────────────────────────────────────────────────

  async fn list_pending_for(&self, user: Uuid) -> Result<Vec<ConnectionRequest>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawRequest> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {REQUEST_COLUMNS} FROM connection_requests
           WHERE to_user_id = ?1 AND status = 'interested'
           ORDER BY updated_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], request_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequest::into_request).collect()
  }

  async fn list_connections_of(&self, user: Uuid) -> Result<Vec<ConnectionRequest>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawRequest> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {REQUEST_COLUMNS} FROM connection_requests
           WHERE status = 'accepted' AND (from_user_id = ?1 OR to_user_id = ?1)
           ORDER BY updated_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], request_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequest::into_request).collect()
  }
}
