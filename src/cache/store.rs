//! In-memory cache store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

/// Source of the current time for `fetched_at` stamps and age checks.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Last known state of one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
  /// The transformed payload, stored as JSON
  pub data: Value,
  /// When the entry was last refreshed or confirmed unchanged
  pub fetched_at: DateTime<Utc>,
  pub etag: Option<String>,
  pub last_modified: Option<String>,
}

/// Keyed table of cache entries, one per resource key.
///
/// Each `get` and `set` is atomic on its own. The store never expires
/// entries and never fails.
pub struct CacheStore {
  entries: RwLock<HashMap<String, CacheEntry>>,
  clock: Box<dyn Clock>,
}

impl CacheStore {
  /// Create an empty store using the wall clock.
  ///
  /// When `force_refresh` is set the table is cleared before first use.
  pub fn new(force_refresh: bool) -> Self {
    Self::with_clock(force_refresh, SystemClock)
  }

  /// Create an empty store with a custom clock.
  pub fn with_clock(force_refresh: bool, clock: impl Clock + 'static) -> Self {
    let store = Self {
      entries: RwLock::new(HashMap::new()),
      clock: Box::new(clock),
    };
    if force_refresh {
      info!("force refresh requested, clearing resource cache");
      store.clear();
    }
    store
  }

  /// Look up the entry for `key`.
  pub fn get(&self, key: &str) -> Option<CacheEntry> {
    self
      .entries
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .cloned()
  }

  /// Replace the entry for `key`, stamping it with the current time.
  pub fn set(&self, key: &str, data: Value, etag: Option<String>, last_modified: Option<String>) {
    let entry = CacheEntry {
      data,
      fetched_at: self.now(),
      etag,
      last_modified,
    };
    self
      .entries
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.to_string(), entry);
  }

  /// Drop every entry.
  pub fn clear(&self) {
    self
      .entries
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .clear();
  }

  /// Current time according to the store's clock.
  pub fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  pub fn len(&self) -> usize {
    self
      .entries
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Default for CacheStore {
  fn default() -> Self {
    Self::new(false)
  }
}

impl std::fmt::Debug for CacheStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CacheStore")
      .field("entries", &self.len())
      .finish()
  }
}


#[cfg(test)]
mod tests {
  use super::testing::ManualClock;
  use super::*;
  use chrono::Duration;
  use serde_json::json;

  #[test]
  fn get_on_empty_store_is_absent() {
    let store = CacheStore::default();
    assert!(store.get("categories").is_none());
    assert!(store.is_empty());
  }

  #[test]
  fn set_stamps_fetched_at_from_clock() {
    let clock = ManualClock::new();
    let store = CacheStore::with_clock(false, clock.clone());

    store.set("accounts", json!(["A", "B"]), Some("\"v1\"".into()), None);
    let entry = store.get("accounts").unwrap();

    assert_eq!(entry.data, json!(["A", "B"]));
    assert_eq!(entry.etag.as_deref(), Some("\"v1\""));
    assert_eq!(entry.last_modified, None);
    assert_eq!(entry.fetched_at, clock.now());
  }

  #[test]
  fn set_replaces_whole_entry() {
    let clock = ManualClock::new();
    let store = CacheStore::with_clock(false, clock.clone());

    store.set(
      "tags",
      json!([1]),
      Some("\"old\"".into()),
      Some("Mon, 02 Mar 2026 10:00:00 GMT".into()),
    );
    clock.advance(Duration::minutes(5));
    store.set("tags", json!([2]), Some("\"new\"".into()), None);

    let entry = store.get("tags").unwrap();
    assert_eq!(entry.data, json!([2]));
    assert_eq!(entry.etag.as_deref(), Some("\"new\""));
    assert_eq!(entry.last_modified, None);
    assert_eq!(entry.fetched_at, clock.now());
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn clear_removes_every_key() {
    let store = CacheStore::default();
    for key in ["categories", "tags", "accounts", "currencies", "defaultCurrency"] {
      store.set(key, json!(null), None, None);
    }
    assert_eq!(store.len(), 5);

    store.clear();

    for key in ["categories", "tags", "accounts", "currencies", "defaultCurrency"] {
      assert!(store.get(key).is_none(), "{key} should be gone");
    }
  }

  #[test]
  fn force_refresh_starts_empty() {
    let store = CacheStore::new(true);
    assert!(store.is_empty());
  }
}
