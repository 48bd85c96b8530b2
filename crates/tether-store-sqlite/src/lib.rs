//! SQLite backend for the Tether relationship ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Every ledger mutation executes
//! inside a single connection call, which combined with the unique pair-key
//! index gives the effectively-serial semantics the ledger requires.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
