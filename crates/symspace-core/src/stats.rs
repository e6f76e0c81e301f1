//! Aggregate counts over the whole symbolic space.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::symbol::SymbolType;

/// Computed fresh on every call; never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolStatistics {
  pub total_symbols:         u64,
  pub symbols_by_type:       BTreeMap<SymbolType, u64>,
  pub total_relationships:   u64,
  pub relationships_by_type: BTreeMap<String, u64>,
}
