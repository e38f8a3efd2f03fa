//! In-memory query cache keyed by serialized request parameters.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
  pub data: T,
  pub timestamp: DateTime<Utc>,
  pub expiry: DateTime<Utc>,
}

#[derive(Debug)]
pub struct QueryCache<T> {
  entries: HashMap<String, CacheEntry<T>>,
  ttl: Duration,
}

impl<T> QueryCache<T> {
  pub fn new(ttl: Duration) -> Self {
    Self {
      entries: HashMap::new(),
      ttl,
    }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// Entry for `key` if it is still valid at `now` (`expiry > now`).
  pub fn get_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<&CacheEntry<T>> {
    self.entries.get(key).filter(|entry| entry.expiry > now)
  }

  /// Store `data` fetched at `fetched_at`; it expires one TTL later.
  pub fn insert(&mut self, key: String, data: T, fetched_at: DateTime<Utc>) {
    self.entries.insert(
      key,
      CacheEntry {
        data,
        timestamp: fetched_at,
        expiry: fetched_at + self.ttl,
      },
    );
  }

  /// Drop every entry with `expiry < now`. Returns how many were removed.
  pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
    let before = self.entries.len();
    self.entries.retain(|_, entry| entry.expiry >= now);
    before - self.entries.len()
  }

  pub fn remove(&mut self, key: &str) -> bool {
    self.entries.remove(key).is_some()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn contains(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
  }

  #[test]
  fn test_entry_valid_strictly_before_expiry() {
    let mut cache = QueryCache::new(Duration::milliseconds(300_000));
    cache.insert("default".to_string(), 1, t0());

    assert!(cache
      .get_fresh("default", t0() + Duration::milliseconds(299_999))
      .is_some());
    // expiry == now is no longer valid
    assert!(cache
      .get_fresh("default", t0() + Duration::milliseconds(300_000))
      .is_none());
  }

  #[test]
  fn test_sweep_removes_only_expired() {
    let mut cache = QueryCache::new(Duration::seconds(10));
    cache.insert("old".to_string(), 1, t0());
    cache.insert("new".to_string(), 2, t0() + Duration::seconds(5));

    assert_eq!(cache.sweep(t0() + Duration::seconds(10)), 0);
    assert_eq!(cache.sweep(t0() + Duration::seconds(11)), 1);
    assert!(!cache.contains("old"));
    assert!(cache.contains("new"));
  }
}
