//! SQL schema for the Tether SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    created_at    TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- At most one row per unordered user pair. pair_key is the canonical
-- 'lo:hi' concatenation of the two user ids; the UNIQUE index is the
-- ground truth for the deduplication invariant, not application code.
CREATE TABLE IF NOT EXISTS connection_requests (
    request_id   TEXT PRIMARY KEY,
    pair_key     TEXT NOT NULL UNIQUE,
    from_user_id TEXT NOT NULL REFERENCES users(user_id),
    to_user_id   TEXT NOT NULL REFERENCES users(user_id),
    status       TEXT NOT NULL,   -- 'interested' | 'ignored' | 'accepted' | 'rejected'
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    CHECK (from_user_id != to_user_id)
);

CREATE INDEX IF NOT EXISTS requests_to_user_idx   ON connection_requests(to_user_id, status);
CREATE INDEX IF NOT EXISTS requests_from_user_idx ON connection_requests(from_user_id, status);

PRAGMA user_version = 1;
";
