//! SQL schema for the symbolic space store.
//!
//! Executed once at connection startup. The layout matches databases written
//! by earlier tooling, so existing files open without migration.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS symbols (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT UNIQUE NOT NULL,
    type         TEXT NOT NULL,           -- lowercase SymbolType
    properties   TEXT,                    -- JSON object, '' when empty
    last_updated TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

-- Relationships referencing a symbol are deleted before the symbol itself.
CREATE TABLE IF NOT EXISTS relationships (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    source_symbol_id INTEGER NOT NULL,
    target_symbol_id INTEGER NOT NULL,
    type             TEXT NOT NULL,
    properties       TEXT,                -- JSON object, '' when empty
    FOREIGN KEY (source_symbol_id) REFERENCES symbols(id),
    FOREIGN KEY (target_symbol_id) REFERENCES symbols(id)
);

CREATE INDEX IF NOT EXISTS idx_symbols_name          ON symbols(name);
CREATE INDEX IF NOT EXISTS idx_symbols_type          ON symbols(type);
CREATE INDEX IF NOT EXISTS idx_relationships_source  ON relationships(source_symbol_id);
CREATE INDEX IF NOT EXISTS idx_relationships_target  ON relationships(target_symbol_id);
CREATE INDEX IF NOT EXISTS idx_relationships_type    ON relationships(type);

PRAGMA user_version = 1;
";
