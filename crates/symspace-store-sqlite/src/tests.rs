//! Integration tests for `SqliteStore` against an in-memory database.

use std::time::Duration;

use serde_json::json;
use symspace_core::{
  PropertyBag,
  graph::find_connected_symbols,
  relationship::NewRelationship,
  stats::SymbolStatistics,
  store::SymbolStore,
  symbol::{SymbolPatch, SymbolType},
};

use crate::{Error, SqliteStore, StoreConfig};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Let the wall clock advance so `last_updated` values differ.
async fn tick() { tokio::time::sleep(Duration::from_millis(5)).await; }

async fn entity(s: &SqliteStore, name: &str) -> i64 {
  s.add_symbol(name, SymbolType::Entity, None).await.unwrap()
}

async fn link(s: &SqliteStore, source: i64, target: i64, ty: &str) -> i64 {
  s.add_relationship(NewRelationship::new(source, target, ty))
    .await
    .unwrap()
    .expect("both endpoints exist")
}

// ─── Symbols ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_symbol() {
  let s = store().await;

  let id = s
    .add_symbol(
      "AI Assistant",
      SymbolType::Entity,
      Some(PropertyBag::new().with("version", "1.0").with("status", "active")),
    )
    .await
    .unwrap();

  let by_id = s.get_symbol_by_id(id).await.unwrap().unwrap();
  assert_eq!(by_id.name, "AI Assistant");
  assert_eq!(by_id.symbol_type, SymbolType::Entity);
  assert_eq!(by_id.properties.get_str("status"), Some("active"));

  let by_name = s.get_symbol_by_name("AI Assistant").await.unwrap().unwrap();
  assert_eq!(by_name, by_id);
}

#[tokio::test]
async fn missing_symbol_lookups_return_none() {
  let s = store().await;
  assert!(s.get_symbol_by_id(42).await.unwrap().is_none());
  assert!(s.get_symbol_by_name("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn symbol_without_properties_has_empty_bag() {
  let s = store().await;
  let id = s.add_symbol("Likes", SymbolType::Relationship, None).await.unwrap();

  let sym = s.get_symbol_by_id(id).await.unwrap().unwrap();
  assert!(sym.properties.is_empty());
}

#[tokio::test]
async fn repeated_add_keeps_one_row_and_id() {
  let s = store().await;

  let first = entity(&s, "Sarah").await;
  let second = entity(&s, "Sarah").await;
  let third = s.add_symbol("Sarah", SymbolType::Memory, None).await.unwrap();

  assert_eq!(first, second);
  assert_eq!(first, third);

  let all = s.list_symbols(None, None).await.unwrap();
  assert_eq!(all.iter().filter(|sym| sym.name == "Sarah").count(), 1);
  // The latest type wins.
  assert_eq!(all[0].symbol_type, SymbolType::Memory);
}

#[tokio::test]
async fn repeated_add_enriches_properties() {
  let s = store().await;

  let first = s
    .add_symbol("Sarah", SymbolType::Entity, Some(PropertyBag::new().with("age", 30)))
    .await
    .unwrap();
  let second = s
    .add_symbol(
      "Sarah",
      SymbolType::Entity,
      Some(PropertyBag::new().with("occupation", "engineer")),
    )
    .await
    .unwrap();
  assert_eq!(first, second);

  let sarah = s.get_symbol_by_name("Sarah").await.unwrap().unwrap();
  assert_eq!(
    sarah.properties,
    PropertyBag::new().with("age", 30).with("occupation", "engineer")
  );
}

#[tokio::test]
async fn add_merges_rather_than_replaces() {
  let s = store().await;
  s.add_symbol("X", SymbolType::Concept, Some(PropertyBag::new().with("a", 1).with("b", 2)))
    .await
    .unwrap();
  s.add_symbol("X", SymbolType::Concept, Some(PropertyBag::new().with("b", 3).with("c", 4)))
    .await
    .unwrap();

  let x = s.get_symbol_by_name("X").await.unwrap().unwrap();
  assert_eq!(x.properties, PropertyBag::new().with("a", 1).with("b", 3).with("c", 4));
}

#[tokio::test]
async fn re_adding_without_properties_preserves_them() {
  let s = store().await;
  s.add_symbol("Python", SymbolType::Concept, Some(PropertyBag::new().with("version", "3.9")))
    .await
    .unwrap();
  s.add_symbol("Python", SymbolType::Concept, None).await.unwrap();

  let py = s.get_symbol_by_name("Python").await.unwrap().unwrap();
  assert_eq!(py.properties.get_str("version"), Some("3.9"));
}

#[tokio::test]
async fn re_adding_refreshes_last_updated() {
  let s = store().await;
  let id = entity(&s, "Sarah").await;
  let before = s.get_symbol_by_id(id).await.unwrap().unwrap().last_updated;

  tick().await;
  entity(&s, "Sarah").await;

  let after = s.get_symbol_by_id(id).await.unwrap().unwrap().last_updated;
  assert!(after > before);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_merges_properties() {
  let s = store().await;
  let id = s
    .add_symbol("X", SymbolType::Entity, Some(PropertyBag::new().with("a", 1).with("b", 2)))
    .await
    .unwrap();

  let changed = s
    .update_symbol(
      id,
      SymbolPatch::default().properties(PropertyBag::new().with("b", 3).with("c", 4)),
    )
    .await
    .unwrap();
  assert!(changed);

  let x = s.get_symbol_by_id(id).await.unwrap().unwrap();
  assert_eq!(x.properties, PropertyBag::new().with("a", 1).with("b", 3).with("c", 4));
  assert_eq!(x.symbol_type, SymbolType::Entity);
}

#[tokio::test]
async fn update_renames_and_retypes() {
  let s = store().await;
  let id = s
    .add_symbol("AI Assistant", SymbolType::Entity, Some(PropertyBag::new().with("k", "v")))
    .await
    .unwrap();

  let changed = s
    .update_symbol(
      id,
      SymbolPatch::default().name("Assistant").symbol_type(SymbolType::Concept),
    )
    .await
    .unwrap();
  assert!(changed);

  assert!(s.get_symbol_by_name("AI Assistant").await.unwrap().is_none());
  let renamed = s.get_symbol_by_name("Assistant").await.unwrap().unwrap();
  assert_eq!(renamed.id, id);
  assert_eq!(renamed.symbol_type, SymbolType::Concept);
  assert_eq!(renamed.properties.get_str("k"), Some("v"));
}

#[tokio::test]
async fn empty_update_is_a_no_op() {
  let s = store().await;
  let id = entity(&s, "Sarah").await;

  assert!(!s.update_symbol(id, SymbolPatch::default()).await.unwrap());
  assert!(!s.update_symbol(id, SymbolPatch::default().name("")).await.unwrap());
  assert_eq!(s.get_symbol_by_id(id).await.unwrap().unwrap().name, "Sarah");
}

#[tokio::test]
async fn update_missing_symbol_returns_false() {
  let s = store().await;
  let changed = s
    .update_symbol(99, SymbolPatch::default().symbol_type(SymbolType::Gist))
    .await
    .unwrap();
  assert!(!changed);
}

#[tokio::test]
async fn rename_onto_taken_name_is_integrity_error() {
  let s = store().await;
  let a = entity(&s, "A").await;
  entity(&s, "B").await;

  let err = s
    .update_symbol(a, SymbolPatch::default().name("B"))
    .await
    .unwrap_err();
  assert!(err.is_integrity());
  assert!(matches!(err, Error::Integrity(_)));

  // Nothing changed.
  assert_eq!(s.get_symbol_by_id(a).await.unwrap().unwrap().name, "A");
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_orders_by_most_recent_update() {
  let s = store().await;
  let first = entity(&s, "first").await;
  tick().await;
  let second = entity(&s, "second").await;
  tick().await;
  let third = entity(&s, "third").await;
  tick().await;
  s.update_symbol(first, SymbolPatch::default().properties(PropertyBag::new().with("n", 1)))
    .await
    .unwrap();

  let ids: Vec<_> = s
    .list_symbols(None, None)
    .await
    .unwrap()
    .into_iter()
    .map(|sym| sym.id)
    .collect();
  assert_eq!(ids, vec![first, third, second]);
}

#[tokio::test]
async fn list_filters_by_type_and_limit() {
  let s = store().await;
  entity(&s, "Sarah").await;
  entity(&s, "AI Assistant").await;
  s.add_symbol("Python", SymbolType::Concept, None).await.unwrap();

  let entities = s.list_symbols(Some(SymbolType::Entity), None).await.unwrap();
  assert_eq!(entities.len(), 2);
  assert!(entities.iter().all(|sym| sym.symbol_type == SymbolType::Entity));

  let limited = s.list_symbols(None, Some(1)).await.unwrap();
  assert_eq!(limited.len(), 1);

  let none = s.list_symbols(Some(SymbolType::Feedback), None).await.unwrap();
  assert!(none.is_empty());
}

// ─── Property queries ────────────────────────────────────────────────────────

#[tokio::test]
async fn query_by_string_property() {
  let s = store().await;
  s.add_symbol("Python", SymbolType::Concept, Some(PropertyBag::new().with("version", "3.9")))
    .await
    .unwrap();
  s.add_symbol("Rust", SymbolType::Concept, Some(PropertyBag::new().with("version", "1.85")))
    .await
    .unwrap();
  s.add_symbol("Likes", SymbolType::Relationship, None).await.unwrap();

  let found = s.query_symbols_by_property("version", &json!("3.9")).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].name, "Python");
}

#[tokio::test]
async fn query_by_numeric_and_bool_property() {
  let s = store().await;
  s.add_symbol(
    "Sarah",
    SymbolType::Entity,
    Some(PropertyBag::new().with("age", 30).with("active", true)),
  )
  .await
  .unwrap();
  s.add_symbol("Bob", SymbolType::Entity, Some(PropertyBag::new().with("age", "30")))
    .await
    .unwrap();

  let by_age = s.query_symbols_by_property("age", &json!(30)).await.unwrap();
  assert_eq!(by_age.len(), 1);
  assert_eq!(by_age[0].name, "Sarah");

  let by_float = s.query_symbols_by_property("age", &json!(30.0)).await.unwrap();
  assert_eq!(by_float.len(), 1);

  let by_flag = s.query_symbols_by_property("active", &json!(true)).await.unwrap();
  assert_eq!(by_flag.len(), 1);
}

#[tokio::test]
async fn query_by_structured_and_dotted_keys() {
  let s = store().await;
  s.add_symbol(
    "Doc",
    SymbolType::Memory,
    Some(
      PropertyBag::new()
        .with("tags", json!(["a", "b"]))
        .with("a.b", "dotted")
        .with("nothing", json!(null)),
    ),
  )
  .await
  .unwrap();

  assert_eq!(s.query_symbols_by_property("tags", &json!(["a", "b"])).await.unwrap().len(), 1);
  assert_eq!(s.query_symbols_by_property("a.b", &json!("dotted")).await.unwrap().len(), 1);
  assert_eq!(s.query_symbols_by_property("nothing", &json!(null)).await.unwrap().len(), 1);
  assert!(s.query_symbols_by_property("tags", &json!(["a"])).await.unwrap().is_empty());
}

#[tokio::test]
async fn query_ignores_symbols_without_key() {
  let s = store().await;
  entity(&s, "Bare").await;
  assert!(s.query_symbols_by_property("version", &json!("3.9")).await.unwrap().is_empty());
}

// ─── Relationships ───────────────────────────────────────────────────────────

#[tokio::test]
async fn add_relationship_between_live_symbols() {
  let s = store().await;
  let sarah = entity(&s, "Sarah").await;
  let python = s.add_symbol("Python", SymbolType::Concept, None).await.unwrap();

  let rel_id = s
    .add_relationship(
      NewRelationship::new(sarah, python, "likes").with_properties(
        PropertyBag::new().with("strength", 0.8).with("reason", "programming"),
      ),
    )
    .await
    .unwrap()
    .unwrap();

  let rels = s.get_relationships_by_symbol(sarah).await.unwrap();
  assert_eq!(rels.len(), 1);
  assert_eq!(rels[0].id, rel_id);
  assert_eq!(rels[0].source_symbol_id, sarah);
  assert_eq!(rels[0].target_symbol_id, python);
  assert_eq!(rels[0].relationship_type, "likes");
  assert_eq!(rels[0].properties.get_f64("strength"), Some(0.8));

  // Visible from the target side too.
  assert_eq!(s.get_relationships_by_symbol(python).await.unwrap().len(), 1);
}

#[tokio::test]
async fn add_relationship_with_missing_endpoint_returns_none() {
  let s = store().await;
  let sarah = entity(&s, "Sarah").await;

  assert!(s.add_relationship(NewRelationship::new(sarah, 999, "likes")).await.unwrap().is_none());
  assert!(s.add_relationship(NewRelationship::new(999, sarah, "likes")).await.unwrap().is_none());
  assert!(s.add_relationship(NewRelationship::new(998, 999, "likes")).await.unwrap().is_none());

  assert!(s.get_relationships_by_symbol(sarah).await.unwrap().is_empty());
}

#[tokio::test]
async fn relationship_without_properties_has_empty_bag() {
  let s = store().await;
  let a = entity(&s, "A").await;
  let b = entity(&s, "B").await;
  link(&s, a, b, "knows").await;

  let rels = s.get_relationships_by_type("knows", None).await.unwrap();
  assert!(rels[0].properties.is_empty());
}

#[tokio::test]
async fn relationships_by_type_respects_limit() {
  let s = store().await;
  let a = entity(&s, "A").await;
  let b = entity(&s, "B").await;
  let c = entity(&s, "C").await;
  link(&s, a, b, "likes").await;
  link(&s, a, c, "likes").await;
  link(&s, b, c, "causes").await;

  assert_eq!(s.get_relationships_by_type("likes", None).await.unwrap().len(), 2);
  assert_eq!(s.get_relationships_by_type("likes", Some(1)).await.unwrap().len(), 1);
  assert_eq!(s.get_relationships_by_type("causes", None).await.unwrap().len(), 1);
  assert!(s.get_relationships_by_type("hates", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_relationship() {
  let s = store().await;
  let a = entity(&s, "A").await;
  let b = entity(&s, "B").await;
  let rel = link(&s, a, b, "likes").await;

  assert!(s.delete_relationship(rel).await.unwrap());
  assert!(!s.delete_relationship(rel).await.unwrap());
  assert!(s.get_relationships_by_symbol(a).await.unwrap().is_empty());
  // Endpoints survive.
  assert!(s.get_symbol_by_id(a).await.unwrap().is_some());
}

// ─── Delete & cascade ────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_symbol_cascades_to_relationships() {
  let s = store().await;
  let hub = entity(&s, "Hub").await;
  let a = entity(&s, "A").await;
  let b = entity(&s, "B").await;
  link(&s, hub, a, "likes").await;
  link(&s, b, hub, "likes").await;
  link(&s, hub, hub, "self").await;
  let untouched = link(&s, a, b, "knows").await;

  assert!(s.delete_symbol(hub).await.unwrap());

  assert!(s.get_symbol_by_id(hub).await.unwrap().is_none());
  assert!(s.get_relationships_by_symbol(hub).await.unwrap().is_empty());

  let remaining = s.get_relationships_by_symbol(a).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].id, untouched);
}

#[tokio::test]
async fn delete_missing_symbol_returns_false() {
  let s = store().await;
  assert!(!s.delete_symbol(7).await.unwrap());
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
  let s = store().await;
  let a = entity(&s, "A").await;
  s.delete_symbol(a).await.unwrap();
  let b = entity(&s, "A").await;
  assert!(b > a);
}

// ─── Traversal ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn traversal_groups_by_depth_through_cycle() {
  let s = store().await;
  let a = entity(&s, "A").await;
  let b = entity(&s, "B").await;
  let c = entity(&s, "C").await;
  link(&s, a, b, "next").await;
  link(&s, b, c, "next").await;
  link(&s, c, a, "next").await;

  let connected = s.find_connected_symbols(a, 5).await.unwrap();

  assert_eq!(connected[&0], vec![a]);
  // A reaches both B and C directly through the cycle's two edges.
  let mut depth_one = connected[&1].clone();
  depth_one.sort();
  assert_eq!(depth_one, vec![b, c]);
  assert_eq!(connected.len(), 2);
}

#[tokio::test]
async fn traversal_terminates_on_back_edges() {
  let s = store().await;
  let a = entity(&s, "A").await;
  let b = entity(&s, "B").await;
  let c = entity(&s, "C").await;
  link(&s, a, b, "next").await;
  link(&s, b, c, "next").await;
  link(&s, c, b, "back").await;

  let connected = s.find_connected_symbols(a, 5).await.unwrap();
  assert_eq!(connected[&0], vec![a]);
  assert_eq!(connected[&1], vec![b]);
  assert_eq!(connected[&2], vec![c]);
  assert_eq!(connected.len(), 3);
}

#[tokio::test]
async fn traversal_follows_chain_depths() {
  let s = store().await;
  let a = entity(&s, "A").await;
  let b = entity(&s, "B").await;
  let c = entity(&s, "C").await;
  let d = entity(&s, "D").await;
  link(&s, a, b, "next").await;
  link(&s, b, c, "next").await;
  link(&s, c, d, "next").await;

  let connected = s.find_connected_symbols(a, 5).await.unwrap();
  assert_eq!(connected[&0], vec![a]);
  assert_eq!(connected[&1], vec![b]);
  assert_eq!(connected[&2], vec![c]);
  assert_eq!(connected[&3], vec![d]);
  assert_eq!(connected.len(), 4);

  let bounded = s.find_connected_symbols(a, 2).await.unwrap();
  assert_eq!(bounded.len(), 3);
  assert!(!bounded.values().flatten().any(|&id| id == d));
}

#[tokio::test]
async fn traversal_visits_each_node_once() {
  let s = store().await;
  let ids = [
    entity(&s, "A").await,
    entity(&s, "B").await,
    entity(&s, "C").await,
    entity(&s, "D").await,
  ];
  // Dense graph with parallel edges and cycles.
  for &x in &ids {
    for &y in &ids {
      if x != y {
        link(&s, x, y, "knows").await;
      }
    }
  }
  link(&s, ids[0], ids[1], "likes").await;

  let connected = find_connected_symbols(&s, ids[0], 5).await.unwrap();
  let mut seen: Vec<_> = connected.values().flatten().copied().collect();
  let total = seen.len();
  seen.sort();
  seen.dedup();
  assert_eq!(seen.len(), total);
  assert_eq!(total, ids.len());
}

#[tokio::test]
async fn traversal_depth_zero_returns_start_only() {
  let s = store().await;
  let a = entity(&s, "A").await;
  let b = entity(&s, "B").await;
  link(&s, a, b, "likes").await;

  let connected = s.find_connected_symbols(a, 0).await.unwrap();
  assert_eq!(connected.len(), 1);
  assert_eq!(connected[&0], vec![a]);
}

#[tokio::test]
async fn traversal_from_isolated_symbol_stops_early() {
  let s = store().await;
  let lonely = entity(&s, "Lonely").await;

  let connected = s.find_connected_symbols(lonely, 3).await.unwrap();
  assert_eq!(connected.len(), 1);
  assert_eq!(connected[&0], vec![lonely]);
}

// ─── Statistics ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn statistics_count_by_type() {
  let s = store().await;
  let sarah = entity(&s, "Sarah").await;
  entity(&s, "AI Assistant").await;
  let python = s.add_symbol("Python", SymbolType::Concept, None).await.unwrap();
  link(&s, sarah, python, "likes").await;

  let stats = s.get_symbol_statistics().await.unwrap();
  assert_eq!(stats.total_symbols, 3);
  assert_eq!(stats.symbols_by_type.get(&SymbolType::Entity), Some(&2));
  assert_eq!(stats.symbols_by_type.get(&SymbolType::Concept), Some(&1));
  assert_eq!(stats.symbols_by_type.len(), 2);
  assert_eq!(stats.total_relationships, 1);
  assert_eq!(stats.relationships_by_type.get("likes"), Some(&1));
  assert_eq!(stats.relationships_by_type.len(), 1);
}

#[tokio::test]
async fn statistics_on_empty_store() {
  let s = store().await;
  let stats = s.get_symbol_statistics().await.unwrap();
  assert_eq!(stats, SymbolStatistics::default());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

fn temp_db(tag: &str) -> std::path::PathBuf {
  let path =
    std::env::temp_dir().join(format!("symspace-{tag}-{}.db", std::process::id()));
  remove_db(&path);
  path
}

fn remove_db(path: &std::path::Path) {
  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}

/// Write rows the way older tooling did, bypassing the store.
fn write_raw(path: &std::path::Path, sql: &str) {
  let conn = rusqlite::Connection::open(path).unwrap();
  conn.execute_batch(sql).unwrap();
}

#[tokio::test]
async fn reopening_a_file_keeps_data() {
  let path = temp_db("reopen");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.add_symbol("Sarah", SymbolType::Entity, Some(PropertyBag::new().with("age", 30)))
      .await
      .unwrap()
  };

  let config = StoreConfig { path: path.clone(), op_timeout_ms: 1_000 };
  let s = SqliteStore::open_with(&config).await.unwrap();
  let sarah = s.get_symbol_by_id(id).await.unwrap().unwrap();
  assert_eq!(sarah.properties.get_i64("age"), Some(30));

  drop(s);
  remove_db(&path);
}

#[tokio::test]
async fn reads_rows_written_by_legacy_tooling() {
  let path = temp_db("legacy");

  write_raw(
    &path,
    "CREATE TABLE symbols (
       id INTEGER PRIMARY KEY AUTOINCREMENT,
       name TEXT UNIQUE NOT NULL,
       type TEXT NOT NULL,
       properties TEXT,
       last_updated TIMESTAMP DEFAULT CURRENT_TIMESTAMP
     );
     INSERT INTO symbols (name, type, properties) VALUES ('Old', 'gist', '');
     INSERT INTO symbols (name, type, properties)
       VALUES ('Older', 'concept', '{\"version\": \"3.9\"}');",
  );

  let s = SqliteStore::open(&path).await.unwrap();
  let old = s.get_symbol_by_name("Old").await.unwrap().unwrap();
  assert_eq!(old.symbol_type, SymbolType::Gist);
  assert!(old.properties.is_empty());

  let found = s.query_symbols_by_property("version", &json!("3.9")).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].name, "Older");

  drop(s);
  remove_db(&path);
}

#[tokio::test]
async fn list_orders_legacy_and_new_timestamps_together() {
  let path = temp_db("mixed-order");
  let s = SqliteStore::open(&path).await.unwrap();

  let now = chrono::Utc::now();
  let legacy = |dt: chrono::DateTime<chrono::Utc>| dt.format("%Y-%m-%d %H:%M:%S").to_string();
  write_raw(
    &path,
    &format!(
      "INSERT INTO symbols (name, type, properties, last_updated)
         VALUES ('Later', 'entity', '', '{}');
       INSERT INTO symbols (name, type, properties, last_updated)
         VALUES ('Earlier', 'entity', '', '{}');",
      legacy(now + chrono::Duration::hours(1)),
      legacy(now - chrono::Duration::hours(1)),
    ),
  );

  entity(&s, "Fresh").await;

  let names: Vec<_> = s
    .list_symbols(None, None)
    .await
    .unwrap()
    .into_iter()
    .map(|sym| sym.name)
    .collect();
  assert_eq!(names, vec!["Later", "Fresh", "Earlier"]);

  drop(s);
  remove_db(&path);
}

#[tokio::test]
async fn zero_timeout_surfaces_as_storage_error() {
  let path = temp_db("timeout");
  let config = StoreConfig { path: path.clone(), op_timeout_ms: 0 };

  let err = SqliteStore::open_with(&config).await.err().expect("timed out");
  assert!(matches!(err, Error::Timeout(d) if d.is_zero()));
  assert!(err.is_storage());
  assert!(!err.is_integrity());

  remove_db(&path);
}

#[tokio::test]
async fn query_with_quoted_key_skips_non_object_rows() {
  let path = temp_db("quoted-key");
  let s = SqliteStore::open(&path).await.unwrap();

  s.add_symbol(
    "Quote",
    SymbolType::Concept,
    Some(PropertyBag::new().with("say \"hi\"", 1)),
  )
  .await
  .unwrap();
  write_raw(
    &path,
    "INSERT INTO symbols (name, type, properties) VALUES ('List', 'gist', '[1]');
     INSERT INTO symbols (name, type, properties) VALUES ('Null', 'gist', 'null');",
  );

  let found = s.query_symbols_by_property("say \"hi\"", &json!(1)).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].name, "Quote");

  // Keys that map onto a JSON path skip those rows too.
  assert!(s.query_symbols_by_property("k", &json!(1)).await.unwrap().is_empty());

  drop(s);
  remove_db(&path);
}
