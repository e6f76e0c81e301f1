//! The `SymbolStore` trait, the registry surface of the symbolic space.
//!
//! Implemented by storage backends (e.g. `symspace-store-sqlite`). Every call
//! is a full round-trip to the backing store; implementations do not cache.

use std::future::Future;

use serde_json::Value;

use crate::{
  PropertyBag,
  relationship::{NewRelationship, Relationship, RelationshipId},
  stats::SymbolStatistics,
  symbol::{Symbol, SymbolId, SymbolPatch, SymbolType},
};

/// Row cap applied when a listing call passes no explicit limit.
pub const DEFAULT_LIMIT: usize = 100;

/// Abstraction over a symbolic-space backend.
///
/// Lookup misses are not errors: they surface as `None` or `false`. The
/// associated `Error` is reserved for storage failures.
pub trait SymbolStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Symbols ───────────────────────────────────────────────────────────

  /// Insert a symbol, or enrich the existing one with the same name.
  ///
  /// On a name collision the existing row keeps its id, takes the given
  /// type, and has `properties` merged into its bag. Returns the id of the
  /// inserted or updated row.
  fn add_symbol(
    &self,
    name: &str,
    symbol_type: SymbolType,
    properties: Option<PropertyBag>,
  ) -> impl Future<Output = Result<SymbolId, Self::Error>> + Send;

  fn get_symbol_by_name(
    &self,
    name: &str,
  ) -> impl Future<Output = Result<Option<Symbol>, Self::Error>> + Send;

  fn get_symbol_by_id(
    &self,
    id: SymbolId,
  ) -> impl Future<Output = Result<Option<Symbol>, Self::Error>> + Send;

  /// Apply a partial update. Returns `true` iff a row changed; an empty
  /// patch or an unknown id yields `false`.
  fn update_symbol(
    &self,
    id: SymbolId,
    patch: SymbolPatch,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

  /// Delete a symbol together with every relationship touching it.
  /// Returns `true` iff the symbol row was removed.
  fn delete_symbol(
    &self,
    id: SymbolId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

  /// Most recently updated first, optionally filtered by type.
  /// `limit` defaults to [`DEFAULT_LIMIT`].
  fn list_symbols(
    &self,
    symbol_type: Option<SymbolType>,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Symbol>, Self::Error>> + Send;

  /// Symbols whose property `key` structurally equals `value`.
  fn query_symbols_by_property(
    &self,
    key: &str,
    value: &Value,
  ) -> impl Future<Output = Result<Vec<Symbol>, Self::Error>> + Send;

  // ── Relationships ─────────────────────────────────────────────────────

  /// Create a relationship. Returns `None` if either endpoint does not
  /// resolve to a live symbol.
  fn add_relationship(
    &self,
    input: NewRelationship,
  ) -> impl Future<Output = Result<Option<RelationshipId>, Self::Error>> + Send;

  /// Every relationship where `id` is the source or the target.
  fn get_relationships_by_symbol(
    &self,
    id: SymbolId,
  ) -> impl Future<Output = Result<Vec<Relationship>, Self::Error>> + Send;

  /// `limit` defaults to [`DEFAULT_LIMIT`].
  fn get_relationships_by_type(
    &self,
    relationship_type: &str,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Relationship>, Self::Error>> + Send;

  fn delete_relationship(
    &self,
    id: RelationshipId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

  // ── Analytics ─────────────────────────────────────────────────────────

  fn get_symbol_statistics(
    &self,
  ) -> impl Future<Output = Result<SymbolStatistics, Self::Error>> + Send;
}
