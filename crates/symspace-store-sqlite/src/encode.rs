//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored in SQLite's own UTC form with a fixed six-digit
//! fraction, so they order lexically against each other and against rows
//! stamped by `CURRENT_TIMESTAMP`. Property bags are stored as compact JSON, with the
//! empty bag written as `''`.

use chrono::{DateTime, NaiveDateTime, Utc};
use symspace_core::{
  PropertyBag,
  relationship::Relationship,
  symbol::{Symbol, SymbolType},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

const SQLITE_DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// `YYYY-MM-DD HH:MM:SS.ffffff`, UTC.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.format(SQLITE_DT_FORMAT).to_string()
}

/// Accepts the encoded form, `CURRENT_TIMESTAMP` (`YYYY-MM-DD HH:MM:SS`) and
/// RFC 3339.
pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Properties ──────────────────────────────────────────────────────────────

pub fn encode_properties(props: Option<&PropertyBag>) -> serde_json::Result<String> {
  match props {
    Some(p) if !p.is_empty() => serde_json::to_string(p),
    _ => Ok(String::new()),
  }
}

/// `NULL` and `''` both decode to the empty bag.
pub fn decode_properties(s: Option<&str>) -> serde_json::Result<PropertyBag> {
  match s.map(str::trim) {
    None | Some("") => Ok(PropertyBag::new()),
    Some(json) => serde_json::from_str(json),
  }
}

/// Merge `update` into the encoded bag `existing` and re-encode.
///
/// Without an update the stored text is returned untouched.
pub fn merge_encoded(
  existing: Option<&str>,
  update: Option<PropertyBag>,
) -> serde_json::Result<String> {
  let Some(update) = update else {
    return Ok(existing.unwrap_or_default().to_owned());
  };
  let mut merged = decode_properties(existing)?;
  merged.merge(update);
  encode_properties(Some(&merged))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSymbol::from_row`].
pub const SYMBOL_COLUMNS: &str = "id, name, type, properties, last_updated";

/// Column list matching [`RawRelationship::from_row`].
pub const RELATIONSHIP_COLUMNS: &str =
  "id, source_symbol_id, target_symbol_id, type, properties";

/// Raw values read directly from a `symbols` row.
pub struct RawSymbol {
  pub id:           i64,
  pub name:         String,
  pub symbol_type:  String,
  pub properties:   Option<String>,
  pub last_updated: String,
}

impl RawSymbol {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      name:         row.get(1)?,
      symbol_type:  row.get(2)?,
      properties:   row.get(3)?,
      last_updated: row.get(4)?,
    })
  }

  pub fn into_symbol(self) -> Result<Symbol> {
    Ok(Symbol {
      id:           self.id,
      name:         self.name,
      symbol_type:  SymbolType::parse(&self.symbol_type)?,
      properties:   decode_properties(self.properties.as_deref())?,
      last_updated: decode_dt(&self.last_updated)?,
    })
  }
}

/// Raw values read directly from a `relationships` row.
pub struct RawRelationship {
  pub id:                i64,
  pub source_symbol_id:  i64,
  pub target_symbol_id:  i64,
  pub relationship_type: String,
  pub properties:        Option<String>,
}

impl RawRelationship {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      source_symbol_id:  row.get(1)?,
      target_symbol_id:  row.get(2)?,
      relationship_type: row.get(3)?,
      properties:        row.get(4)?,
    })
  }

  pub fn into_relationship(self) -> Result<Relationship> {
    Ok(Relationship {
      id:                self.id,
      source_symbol_id:  self.source_symbol_id,
      target_symbol_id:  self.target_symbol_id,
      relationship_type: self.relationship_type,
      properties:        decode_properties(self.properties.as_deref())?,
    })
  }
}
