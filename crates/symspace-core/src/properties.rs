//! The open, string-keyed attribute bag attached to symbols and relationships.
//!
//! Values are arbitrary JSON. Callers read them through typed accessors
//! rather than matching on [`serde_json::Value`] themselves.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object of arbitrary properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(Map<String, Value>);

impl PropertyBag {
  pub fn new() -> Self { Self::default() }

  /// Chaining form of [`insert`](Self::insert).
  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.insert(key, value);
    self
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.0.insert(key.into(), value.into())
  }

  pub fn remove(&mut self, key: &str) -> Option<Value> { self.0.remove(key) }

  pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

  pub fn contains_key(&self, key: &str) -> bool { self.0.contains_key(key) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> { self.0.iter() }

  /// Merge `other` into `self`: keys in `other` overwrite, keys only in
  /// `self` are kept.
  pub fn merge(&mut self, other: PropertyBag) {
    self.0.extend(other.0);
  }

  pub fn get_str(&self, key: &str) -> Option<&str> { self.get(key)?.as_str() }

  pub fn get_f64(&self, key: &str) -> Option<f64> { self.get(key)?.as_f64() }

  pub fn get_i64(&self, key: &str) -> Option<i64> { self.get(key)?.as_i64() }

  pub fn get_bool(&self, key: &str) -> Option<bool> { self.get(key)?.as_bool() }

  pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> { self.get(key)?.as_array() }

  pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
    self.get(key)?.as_object()
  }

  /// Structural equality of the value under `key` with `expected`.
  ///
  /// Numbers compare by value, so `30` matches `30.0`.
  pub fn matches(&self, key: &str, expected: &Value) -> bool {
    self.get(key).is_some_and(|actual| json_eq(actual, expected))
  }

  pub fn into_inner(self) -> Map<String, Value> { self.0 }
}

fn json_eq(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
      (Some(x), Some(y)) => x == y,
      _ => x.as_f64() == y.as_f64(),
    },
    (Value::Array(xs), Value::Array(ys)) => {
      xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
    }
    (Value::Object(xs), Value::Object(ys)) => {
      xs.len() == ys.len()
        && xs
          .iter()
          .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
    }
    _ => a == b,
  }
}

impl From<Map<String, Value>> for PropertyBag {
  fn from(map: Map<String, Value>) -> Self { Self(map) }
}

impl FromIterator<(String, Value)> for PropertyBag {
  fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl IntoIterator for PropertyBag {
  type Item = (String, Value);
  type IntoIter = serde_json::map::IntoIter;

  fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}
