//! Bounded breadth-first traversal over the relationship graph.
//!
//! Edges are followed in both directions. Each reachable symbol is reported
//! once, in the bucket of its hop distance from the start.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::{store::SymbolStore, symbol::SymbolId};

/// Default hop bound for [`find_connected_symbols`] callers that have none.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Reachable symbol ids grouped by hop distance. Depth `0` holds the start.
pub type ConnectedSymbols = BTreeMap<usize, Vec<SymbolId>>;

/// Collect every symbol reachable from `start` within `max_depth` hops.
///
/// Stops early once a level discovers nothing new, so sparse regions do not
/// cost `max_depth` rounds. `start` is not required to exist.
pub async fn find_connected_symbols<S>(
  store: &S,
  start: SymbolId,
  max_depth: usize,
) -> Result<ConnectedSymbols, S::Error>
where
  S: SymbolStore + ?Sized,
{
  debug!(start, max_depth, "finding connected symbols");

  let mut connected = ConnectedSymbols::new();
  connected.insert(0, vec![start]);

  let mut visited = HashSet::from([start]);
  let mut current_level = vec![start];

  for depth in 1..=max_depth {
    let mut next_level = Vec::new();

    for &current in &current_level {
      for rel in store.get_relationships_by_symbol(current).await? {
        let neighbor = rel.neighbor_of(current);
        if visited.insert(neighbor) {
          next_level.push(neighbor);
        }
      }
    }

    if next_level.is_empty() {
      break;
    }

    connected.insert(depth, next_level.clone());
    current_level = next_level;
  }

  Ok(connected)
}
