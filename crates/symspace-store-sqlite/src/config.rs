//! Store configuration.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// Database file used when no path is configured.
pub const DEFAULT_PATH: &str = "unified_symbolic_space.db";

const DEFAULT_OP_TIMEOUT_MS: u64 = 5_000;

/// Settings for [`SqliteStore::open_with`](crate::SqliteStore::open_with).
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  #[serde(default = "default_path")]
  pub path:          PathBuf,
  /// Upper bound for a single store round-trip, in milliseconds.
  #[serde(default = "default_op_timeout_ms")]
  pub op_timeout_ms: u64,
}

impl StoreConfig {
  pub fn op_timeout(&self) -> Duration { Duration::from_millis(self.op_timeout_ms) }
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self { path: default_path(), op_timeout_ms: default_op_timeout_ms() }
  }
}

fn default_path() -> PathBuf { PathBuf::from(DEFAULT_PATH) }

fn default_op_timeout_ms() -> u64 { DEFAULT_OP_TIMEOUT_MS }
