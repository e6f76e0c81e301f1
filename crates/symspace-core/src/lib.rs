//! Core types and trait definitions for the unified symbolic space.
//!
//! The symbolic space is a graph of uniquely-named, typed symbols joined by
//! directed, typed relationships. This crate holds the data model, the
//! [`SymbolStore`](store::SymbolStore) abstraction and the graph traversal
//! built on top of it. It carries no database dependency.

pub mod error;
pub mod graph;
pub mod properties;
pub mod relationship;
pub mod stats;
pub mod store;
pub mod symbol;

pub use error::{Error, Result};
pub use properties::PropertyBag;
