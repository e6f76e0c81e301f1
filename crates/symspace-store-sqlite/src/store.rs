//! [`SqliteStore`], the SQLite implementation of [`SymbolStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, ffi};
use serde_json::Value;
use tracing::{debug, info, warn};

use symspace_core::{
  PropertyBag,
  graph::{self, ConnectedSymbols},
  relationship::{NewRelationship, Relationship, RelationshipId},
  stats::SymbolStatistics,
  store::{DEFAULT_LIMIT, SymbolStore},
  symbol::{Symbol, SymbolId, SymbolPatch, SymbolType},
};

use crate::{
  Error, Result,
  config::StoreConfig,
  encode::{
    RELATIONSHIP_COLUMNS, RawRelationship, RawSymbol, SYMBOL_COLUMNS, encode_dt,
    encode_properties, merge_encoded,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A symbolic space backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All
/// operations are serialised on the connection's thread, and each one runs
/// in its own transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn:       tokio_rusqlite::Connection,
  op_timeout: Duration,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with default settings.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let config = StoreConfig {
      path: path.as_ref().to_path_buf(),
      ..StoreConfig::default()
    };
    Self::open_with(&config).await
  }

  /// Open (or create) the store described by `config`.
  pub async fn open_with(config: &StoreConfig) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(&config.path).await?;
    let store = Self { conn, op_timeout: config.op_timeout() };
    store.init_schema().await?;
    info!(path = %config.path.display(), "opened symbolic space");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, op_timeout: StoreConfig::default().op_timeout() };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Run `f` on the connection thread, bounded by the operation timeout.
  ///
  /// A timed-out closure is not interrupted; its effects may still land
  /// after the caller has seen [`Error::Timeout`].
  async fn call<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    match tokio::time::timeout(self.op_timeout, self.conn.call(f)).await {
      Ok(result) => Ok(result?),
      Err(_) => Err(Error::Timeout(self.op_timeout)),
    }
  }

  /// Bounded breadth-first search from `start`; see
  /// [`graph::find_connected_symbols`].
  pub async fn find_connected_symbols(
    &self,
    start: SymbolId,
    max_depth: usize,
  ) -> Result<ConnectedSymbols> {
    graph::find_connected_symbols(self, start, max_depth).await
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

enum Upsert {
  Inserted(SymbolId),
  Merged(SymbolId),
}

enum Patched {
  Missing,
  NameTaken,
  Changed(usize),
}

enum Linked {
  Inserted(RelationshipId),
  MissingEndpoints(Vec<SymbolId>),
}

fn is_constraint(err: &rusqlite::Error, extended_code: std::ffi::c_int) -> bool {
  matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.extended_code == extended_code)
}

fn json_failure(err: serde_json::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(err))
}

/// Which of `source` and `target` have no symbol row.
fn missing_endpoints(
  conn: &rusqlite::Connection,
  source: SymbolId,
  target: SymbolId,
) -> rusqlite::Result<Vec<SymbolId>> {
  let mut missing = Vec::new();
  for id in [source, target] {
    if missing.contains(&id) {
      continue;
    }
    let exists = conn
      .query_row(
        "SELECT 1 FROM symbols WHERE id = ?1",
        rusqlite::params![id],
        |_| Ok(()),
      )
      .optional()?
      .is_some();
    if !exists {
      missing.push(id);
    }
  }
  Ok(missing)
}

/// SQLite JSON path selecting the top-level `key`, if it can be expressed.
fn json_key_path(key: &str) -> Option<String> {
  (!key.contains('"')).then(|| format!("$.\"{key}\""))
}

// ─── SymbolStore impl ────────────────────────────────────────────────────────

impl SymbolStore for SqliteStore {
  type Error = Error;

  // ── Symbols ───────────────────────────────────────────────────────────────

  async fn add_symbol(
    &self,
    name: &str,
    symbol_type: SymbolType,
    properties: Option<PropertyBag>,
  ) -> Result<SymbolId> {
    debug!(name, %symbol_type, "adding symbol");

    let name_owned = name.to_owned();
    let type_str   = symbol_type.as_str();
    let props_str  = encode_properties(properties.as_ref())?;
    let at_str     = encode_dt(Utc::now());

    let outcome = self
      .call(move |conn| {
        let tx = conn.transaction()?;

        let inserted = tx.execute(
          "INSERT INTO symbols (name, type, properties, last_updated)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![name_owned, type_str, props_str, at_str],
        );

        let outcome = match inserted {
          Ok(_) => Upsert::Inserted(tx.last_insert_rowid()),
          Err(e) if is_constraint(&e, ffi::SQLITE_CONSTRAINT_UNIQUE) => {
            let (id, existing): (i64, Option<String>) = tx.query_row(
              "SELECT id, properties FROM symbols WHERE name = ?1",
              rusqlite::params![name_owned],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let merged =
              merge_encoded(existing.as_deref(), properties).map_err(json_failure)?;
            tx.execute(
              "UPDATE symbols SET type = ?1, properties = ?2, last_updated = ?3
               WHERE id = ?4",
              rusqlite::params![type_str, merged, at_str, id],
            )?;
            Upsert::Merged(id)
          }
          Err(e) => return Err(e.into()),
        };

        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    Ok(match outcome {
      Upsert::Inserted(id) => {
        info!(name, id, "symbol added");
        id
      }
      Upsert::Merged(id) => {
        warn!(name, id, "symbol already exists; merged into existing row");
        id
      }
    })
  }

  async fn get_symbol_by_name(&self, name: &str) -> Result<Option<Symbol>> {
    debug!(name, "getting symbol by name");
    let name = name.to_owned();

    let raw: Option<RawSymbol> = self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SYMBOL_COLUMNS} FROM symbols WHERE name = ?1"),
              rusqlite::params![name],
              RawSymbol::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSymbol::into_symbol).transpose()
  }

  async fn get_symbol_by_id(&self, id: SymbolId) -> Result<Option<Symbol>> {
    debug!(id, "getting symbol by id");

    let raw: Option<RawSymbol> = self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SYMBOL_COLUMNS} FROM symbols WHERE id = ?1"),
              rusqlite::params![id],
              RawSymbol::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSymbol::into_symbol).transpose()
  }

  async fn update_symbol(&self, id: SymbolId, patch: SymbolPatch) -> Result<bool> {
    debug!(id, "updating symbol");

    if patch.is_empty() {
      debug!(id, "nothing to update");
      return Ok(false);
    }

    let name       = patch.name.filter(|n| !n.is_empty());
    let requested  = name.clone();
    let type_str   = patch.symbol_type.map(SymbolType::as_str);
    let properties = patch.properties.filter(|p| !p.is_empty());
    let at_str     = encode_dt(Utc::now());

    let outcome = self
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<Option<String>> = tx
          .query_row(
            "SELECT properties FROM symbols WHERE id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
          )
          .optional()?;
        let Some(existing) = existing else {
          return Ok(Patched::Missing);
        };

        let mut sets: Vec<&'static str> = vec![];
        let mut values: Vec<rusqlite::types::Value> = vec![];
        if let Some(name) = name {
          sets.push("name = ?");
          values.push(name.into());
        }
        if let Some(t) = type_str {
          sets.push("type = ?");
          values.push(t.to_owned().into());
        }
        if let Some(props) = properties {
          let merged =
            merge_encoded(existing.as_deref(), Some(props)).map_err(json_failure)?;
          sets.push("properties = ?");
          values.push(merged.into());
        }
        sets.push("last_updated = ?");
        values.push(at_str.into());
        values.push(id.into());

        let sql = format!("UPDATE symbols SET {} WHERE id = ?", sets.join(", "));
        let changed = match tx.execute(&sql, rusqlite::params_from_iter(values)) {
          Ok(n) => n,
          Err(e) if is_constraint(&e, ffi::SQLITE_CONSTRAINT_UNIQUE) => {
            return Ok(Patched::NameTaken);
          }
          Err(e) => return Err(e.into()),
        };

        tx.commit()?;
        Ok(Patched::Changed(changed))
      })
      .await?;

    match outcome {
      Patched::Missing => {
        warn!(id, "symbol not found; nothing updated");
        Ok(false)
      }
      Patched::NameTaken => Err(Error::Integrity(format!(
        "cannot rename symbol {id}: name {:?} is already taken",
        requested.unwrap_or_default()
      ))),
      Patched::Changed(0) => {
        warn!(id, "no rows affected by update");
        Ok(false)
      }
      Patched::Changed(_) => {
        info!(id, "symbol updated");
        Ok(true)
      }
    }
  }

  async fn delete_symbol(&self, id: SymbolId) -> Result<bool> {
    debug!(id, "deleting symbol");

    let (relationships, symbols) = self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let relationships = tx.execute(
          "DELETE FROM relationships
           WHERE source_symbol_id = ?1 OR target_symbol_id = ?1",
          rusqlite::params![id],
        )?;
        let symbols =
          tx.execute("DELETE FROM symbols WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok((relationships, symbols))
      })
      .await?;

    if symbols > 0 {
      info!(id, cascaded = relationships, "symbol deleted");
    } else {
      warn!(id, "no rows affected when deleting symbol");
    }
    Ok(symbols > 0)
  }

  async fn list_symbols(
    &self,
    symbol_type: Option<SymbolType>,
    limit: Option<usize>,
  ) -> Result<Vec<Symbol>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    debug!(symbol_type = ?symbol_type, limit, "listing symbols");

    let type_str  = symbol_type.map(SymbolType::as_str);
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawSymbol> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SYMBOL_COLUMNS} FROM symbols
           WHERE ?1 IS NULL OR type = ?1
           ORDER BY last_updated DESC, id DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![type_str, limit_val], RawSymbol::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSymbol::into_symbol).collect()
  }

  async fn query_symbols_by_property(&self, key: &str, value: &Value) -> Result<Vec<Symbol>> {
    debug!(key, %value, "querying symbols by property");

    // Pre-select rows that carry the key; value equality is checked below so
    // numbers, arrays and objects compare structurally.
    let path = json_key_path(key);

    let raws: Vec<RawSymbol> = self
      .call(move |conn| {
        let rows = if let Some(path) = path {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SYMBOL_COLUMNS} FROM symbols
             WHERE CASE WHEN json_valid(properties)
                        THEN json_type(properties, ?1) END IS NOT NULL
             ORDER BY id"
          ))?;
          stmt
            .query_map(rusqlite::params![path], RawSymbol::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SYMBOL_COLUMNS} FROM symbols
             WHERE CASE WHEN json_valid(properties)
                        THEN json_type(properties) = 'object' END
             ORDER BY id"
          ))?;
          stmt
            .query_map([], RawSymbol::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    let mut matched = Vec::new();
    for raw in raws {
      let symbol = raw.into_symbol()?;
      if symbol.properties.matches(key, value) {
        matched.push(symbol);
      }
    }
    Ok(matched)
  }

  // ── Relationships ─────────────────────────────────────────────────────────

  async fn add_relationship(&self, input: NewRelationship) -> Result<Option<RelationshipId>> {
    let NewRelationship {
      source_symbol_id: source,
      target_symbol_id: target,
      relationship_type,
      properties,
    } = input;
    debug!(source, target, %relationship_type, "adding relationship");

    let props_str = encode_properties(properties.as_ref())?;

    // Endpoint checks and the insert share one transaction; the foreign keys
    // catch anything the checks miss.
    let outcome = self
      .call(move |conn| {
        let tx = conn.transaction()?;

        let missing = missing_endpoints(&tx, source, target)?;
        if !missing.is_empty() {
          return Ok(Linked::MissingEndpoints(missing));
        }

        let inserted = tx.execute(
          "INSERT INTO relationships
             (source_symbol_id, target_symbol_id, type, properties)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![source, target, relationship_type, props_str],
        );
        match inserted {
          Ok(_) => {}
          Err(e) if is_constraint(&e, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
            let missing = missing_endpoints(&tx, source, target)?;
            return Ok(Linked::MissingEndpoints(missing));
          }
          Err(e) => return Err(e.into()),
        }

        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Linked::Inserted(id))
      })
      .await?;

    match outcome {
      Linked::Inserted(id) => {
        info!(id, source, target, "relationship added");
        Ok(Some(id))
      }
      Linked::MissingEndpoints(missing) => {
        for id in &missing {
          let role = if *id == source { "source" } else { "target" };
          warn!(id, role, "relationship endpoint not found");
        }
        Ok(None)
      }
    }
  }

  async fn get_relationships_by_symbol(&self, id: SymbolId) -> Result<Vec<Relationship>> {
    debug!(id, "getting relationships for symbol");

    let raws: Vec<RawRelationship> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RELATIONSHIP_COLUMNS} FROM relationships
           WHERE source_symbol_id = ?1 OR target_symbol_id = ?1
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], RawRelationship::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRelationship::into_relationship).collect()
  }

  async fn get_relationships_by_type(
    &self,
    relationship_type: &str,
    limit: Option<usize>,
  ) -> Result<Vec<Relationship>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    debug!(relationship_type, limit, "getting relationships by type");

    let type_str  = relationship_type.to_owned();
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawRelationship> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RELATIONSHIP_COLUMNS} FROM relationships
           WHERE type = ?1
           ORDER BY id
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![type_str, limit_val], RawRelationship::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRelationship::into_relationship).collect()
  }

  async fn delete_relationship(&self, id: RelationshipId) -> Result<bool> {
    debug!(id, "deleting relationship");

    let deleted = self
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM relationships WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;

    if deleted > 0 {
      info!(id, "relationship deleted");
    } else {
      warn!(id, "no rows affected when deleting relationship");
    }
    Ok(deleted > 0)
  }

  // ── Analytics ─────────────────────────────────────────────────────────────

  async fn get_symbol_statistics(&self) -> Result<SymbolStatistics> {
    debug!("getting symbol space statistics");

    let (total_symbols, by_type, total_relationships, rels_by_type) = self
      .call(|conn| {
        let total_symbols: i64 =
          conn.query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))?;
        let by_type = conn
          .prepare("SELECT type, COUNT(*) FROM symbols GROUP BY type")?
          .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let total_relationships: i64 =
          conn.query_row("SELECT COUNT(*) FROM relationships", [], |row| row.get(0))?;
        let rels_by_type = conn
          .prepare("SELECT type, COUNT(*) FROM relationships GROUP BY type")?
          .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total_symbols, by_type, total_relationships, rels_by_type))
      })
      .await?;

    let symbols_by_type = by_type
      .into_iter()
      .map(|(t, n)| -> Result<(SymbolType, u64)> {
        Ok((SymbolType::parse(&t)?, n as u64))
      })
      .collect::<Result<_>>()?;

    Ok(SymbolStatistics {
      total_symbols: total_symbols as u64,
      symbols_by_type,
      total_relationships: total_relationships as u64,
      relationships_by_type: rels_by_type
        .into_iter()
        .map(|(t, n)| (t, n as u64))
        .collect(),
    })
  }
}
