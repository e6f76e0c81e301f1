//! `symspace`: command-line access to a unified symbolic space.
//!
//! Reads `symspace.toml` (or the path given with `--config`), overlays
//! `SYMSPACE_*` environment variables, opens the SQLite store, and runs a
//! single operation. Results are printed as JSON on stdout.
//!
//! # Usage
//!
//! ```text
//! symspace add Sarah --type entity --props '{"age":30}'
//! symspace link 1 2 likes --props '{"strength":0.8}'
//! symspace connected 1 --depth 2
//! symspace stats
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use symspace_core::{
  PropertyBag,
  graph::DEFAULT_MAX_DEPTH,
  relationship::NewRelationship,
  store::SymbolStore,
  symbol::{SymbolPatch, SymbolType},
};
use symspace_store_sqlite::{SqliteStore, StoreConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Unified symbolic space store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "symspace.toml")]
  config: PathBuf,

  /// Database file; overrides the configured `path`.
  #[arg(long)]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Add a symbol, or merge into the existing one with the same name.
  Add {
    name:  String,
    #[arg(short, long, value_parser = parse_symbol_type, default_value = "unknown")]
    r#type: SymbolType,
    /// JSON object of properties.
    #[arg(short, long)]
    props: Option<String>,
  },
  /// Show a symbol by numeric id or by name.
  Get { key: String },
  /// Partially update a symbol.
  Update {
    id:    i64,
    #[arg(long)]
    name:  Option<String>,
    #[arg(short, long, value_parser = parse_symbol_type)]
    r#type: Option<SymbolType>,
    #[arg(short, long)]
    props: Option<String>,
  },
  /// Delete a symbol and every relationship touching it.
  Delete { id: i64 },
  /// List symbols, most recently updated first.
  List {
    #[arg(short, long, value_parser = parse_symbol_type)]
    r#type: Option<SymbolType>,
    #[arg(short, long)]
    limit:  Option<usize>,
  },
  /// Find symbols whose property `key` equals the JSON `value`.
  Query { key: String, value: String },
  /// Create a relationship between two symbols.
  Link {
    source: i64,
    target: i64,
    r#type: String,
    #[arg(short, long)]
    props:  Option<String>,
  },
  /// Delete a relationship.
  Unlink { id: i64 },
  /// List relationships touching a symbol, or of a given type.
  Relations {
    #[arg(long, conflicts_with = "type", required_unless_present = "type")]
    symbol: Option<i64>,
    #[arg(short, long)]
    r#type: Option<String>,
    #[arg(short, long)]
    limit:  Option<usize>,
  },
  /// Symbols reachable from `id`, grouped by hop distance.
  Connected {
    id: i64,
    #[arg(short, long, default_value_t = DEFAULT_MAX_DEPTH)]
    depth: usize,
  },
  /// Aggregate counts by symbol and relationship type.
  Stats,
}

fn parse_symbol_type(s: &str) -> Result<SymbolType, String> {
  SymbolType::parse(&s.to_lowercase()).map_err(|e| e.to_string())
}

// ─── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("SYMSPACE"))
    .build()
    .context("failed to read config file")?;

  let mut store_cfg: StoreConfig = settings
    .try_deserialize()
    .context("failed to deserialise StoreConfig")?;
  if let Some(db) = cli.db {
    store_cfg.path = db;
  }
  let home = std::env::var_os("HOME").map(PathBuf::from);
  store_cfg.path = expand_tilde(&store_cfg.path, home.as_deref());

  let store = SqliteStore::open_with(&store_cfg)
    .await
    .with_context(|| format!("failed to open store at {:?}", store_cfg.path))?;

  run(&store, cli.command).await
}

async fn run(store: &SqliteStore, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Add { name, r#type, props } => {
      let id = store.add_symbol(&name, r#type, parse_props(props)?).await?;
      print_json(&serde_json::json!({ "id": id }))
    }
    Command::Get { key } => {
      let symbol = match key.parse::<i64>() {
        Ok(id) => store.get_symbol_by_id(id).await?,
        Err(_) => store.get_symbol_by_name(&key).await?,
      };
      match symbol {
        Some(s) => print_json(&s),
        None => bail!("symbol {key:?} not found"),
      }
    }
    Command::Update { id, name, r#type, props } => {
      let patch = SymbolPatch {
        name,
        symbol_type: r#type,
        properties: parse_props(props)?,
      };
      let updated = store.update_symbol(id, patch).await?;
      print_json(&serde_json::json!({ "updated": updated }))
    }
    Command::Delete { id } => {
      let deleted = store.delete_symbol(id).await?;
      print_json(&serde_json::json!({ "deleted": deleted }))
    }
    Command::List { r#type, limit } => print_json(&store.list_symbols(r#type, limit).await?),
    Command::Query { key, value } => {
      // Anything that is not valid JSON is taken as a bare string.
      let value = serde_json::from_str(&value).unwrap_or_else(|_| Value::String(value));
      print_json(&store.query_symbols_by_property(&key, &value).await?)
    }
    Command::Link { source, target, r#type, props } => {
      let mut input = NewRelationship::new(source, target, r#type);
      input.properties = parse_props(props)?;
      match store.add_relationship(input).await? {
        Some(id) => print_json(&serde_json::json!({ "id": id })),
        None => bail!("symbol {source} or {target} does not exist"),
      }
    }
    Command::Unlink { id } => {
      let deleted = store.delete_relationship(id).await?;
      print_json(&serde_json::json!({ "deleted": deleted }))
    }
    Command::Relations { symbol, r#type, limit } => {
      let relationships = match (symbol, r#type) {
        (Some(id), _) => store.get_relationships_by_symbol(id).await?,
        (None, Some(ty)) => store.get_relationships_by_type(&ty, limit).await?,
        (None, None) => bail!("either --symbol or --type is required"),
      };
      print_json(&relationships)
    }
    Command::Connected { id, depth } => {
      print_json(&store.find_connected_symbols(id, depth).await?)
    }
    Command::Stats => print_json(&store.get_symbol_statistics().await?),
  }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Parse a `--props` argument as a JSON object.
fn parse_props(raw: Option<String>) -> anyhow::Result<Option<PropertyBag>> {
  raw
    .map(|s| serde_json::from_str::<PropertyBag>(&s).context("--props must be a JSON object"))
    .transpose()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

/// Expand a leading `~` to `home`.
fn expand_tilde(path: &Path, home: Option<&Path>) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Some(home) = home
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
