//! SQLite backend for the unified symbolic space.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every round-trip is bounded by the
//! configured operation timeout.

mod encode;
mod schema;
mod store;

pub mod config;
pub mod error;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
