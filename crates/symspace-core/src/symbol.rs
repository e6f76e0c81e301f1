//! Symbols: the uniquely-named nodes of the symbolic space.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, PropertyBag, Result};

/// Store-assigned identity of a symbol. Never reused once deleted.
pub type SymbolId = i64;

/// What a symbol stands for.
///
/// Persisted as its lowercase name (`"entity"`, `"concept"`, ...).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SymbolType {
  Entity,
  Concept,
  Action,
  Property,
  Relationship,
  Memory,
  Gist,
  Feedback,
  Unknown,
}

impl SymbolType {
  /// The canonical storage string.
  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse a canonical storage string.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownSymbolType(s.to_owned()))
  }
}

/// A named, typed node carrying an open property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
  pub id:           SymbolId,
  /// Unique across the whole symbol table.
  pub name:         String,
  #[serde(rename = "type")]
  pub symbol_type:  SymbolType,
  #[serde(default)]
  pub properties:   PropertyBag,
  /// Set on creation, refreshed on every mutation.
  pub last_updated: DateTime<Utc>,
}

/// Partial update for [`SymbolStore::update_symbol`](crate::store::SymbolStore::update_symbol).
///
/// Every field is independently optional. Supplied properties are merged
/// into the existing bag rather than replacing it.
#[derive(Debug, Clone, Default)]
pub struct SymbolPatch {
  pub name:        Option<String>,
  pub symbol_type: Option<SymbolType>,
  pub properties:  Option<PropertyBag>,
}

impl SymbolPatch {
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn symbol_type(mut self, symbol_type: SymbolType) -> Self {
    self.symbol_type = Some(symbol_type);
    self
  }

  pub fn properties(mut self, properties: PropertyBag) -> Self {
    self.properties = Some(properties);
    self
  }

  /// `true` when the patch would change nothing.
  ///
  /// An empty name or an empty property bag counts as not supplied.
  pub fn is_empty(&self) -> bool {
    self.name.as_deref().is_none_or(str::is_empty)
      && self.symbol_type.is_none()
      && self.properties.as_ref().is_none_or(PropertyBag::is_empty)
  }
}
