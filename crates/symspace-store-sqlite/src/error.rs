//! Error type for `symspace-store-sqlite`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] symspace_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A store round-trip did not finish within the configured bound.
  #[error("store operation timed out after {0:?}")]
  Timeout(Duration),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A constraint violation that has no soft `None`/`false` outcome, e.g.
  /// renaming a symbol onto a name that is already taken.
  #[error("integrity violation: {0}")]
  Integrity(String),
}

impl Error {
  /// Failures of the storage engine itself, including undecodable rows.
  pub fn is_storage(&self) -> bool { !self.is_integrity() }

  pub fn is_integrity(&self) -> bool { matches!(self, Self::Integrity(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
