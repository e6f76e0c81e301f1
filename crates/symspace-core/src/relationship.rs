//! Relationships: directed, typed edges between two symbols.
//!
//! Relationships have no partial update. They are created once and removed
//! either explicitly or by a cascading symbol delete.

use serde::{Deserialize, Serialize};

use crate::{PropertyBag, symbol::SymbolId};

/// Store-assigned identity of a relationship.
pub type RelationshipId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
  pub id:                RelationshipId,
  pub source_symbol_id:  SymbolId,
  pub target_symbol_id:  SymbolId,
  /// Free-form label, e.g. `"likes"` or `"causes"`.
  #[serde(rename = "type")]
  pub relationship_type: String,
  #[serde(default)]
  pub properties:        PropertyBag,
}

impl Relationship {
  /// The endpoint on the other side of `from`.
  ///
  /// A self-loop yields `from` itself.
  pub fn neighbor_of(&self, from: SymbolId) -> SymbolId {
    if self.source_symbol_id == from {
      self.target_symbol_id
    } else {
      self.source_symbol_id
    }
  }
}

/// Input for [`SymbolStore::add_relationship`](crate::store::SymbolStore::add_relationship).
#[derive(Debug, Clone)]
pub struct NewRelationship {
  pub source_symbol_id:  SymbolId,
  pub target_symbol_id:  SymbolId,
  pub relationship_type: String,
  pub properties:        Option<PropertyBag>,
}

impl NewRelationship {
  pub fn new(
    source_symbol_id: SymbolId,
    target_symbol_id: SymbolId,
    relationship_type: impl Into<String>,
  ) -> Self {
    Self {
      source_symbol_id,
      target_symbol_id,
      relationship_type: relationship_type.into(),
      properties: None,
    }
  }

  pub fn with_properties(mut self, properties: PropertyBag) -> Self {
    self.properties = Some(properties);
    self
  }
}
