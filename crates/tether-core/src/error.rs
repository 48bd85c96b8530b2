//! Error types for `tether-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("a user cannot hold a relationship with themselves")]
  SelfReference,

  #[error("unknown connection status: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
