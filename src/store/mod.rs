//! Generic caching stores over the API.
//!
//! A [`Store`] holds the state of one resource (courses, grades, ...) plus a
//! cache of past responses keyed by the request's [`QueryKey`]. Fetching with
//! a key whose cache entry is still valid republishes the cached data without
//! touching the network. Stores are cheap to clone and share one state.

mod cache;
mod keys;
mod registry;
mod state;

pub use keys::{AssignmentKey, CourseKey, GradeKey, QueryKey, UserKey};
pub use registry::{mean_score, Stores};
pub use state::{Resource, StoreState};

use cache::QueryCache;
use state::{reduce, StoreAction};

use chrono::Duration;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clock::SharedClock;
use crate::error::ApiResult;

/// Loads the resource for a key.
pub type Fetcher<T, K> = Arc<dyn Fn(K) -> BoxFuture<'static, ApiResult<Resource<T>>> + Send + Sync>;

struct Inner<T> {
  state: StoreState<T>,
  cache: QueryCache<Resource<T>>,
}

pub struct Store<T, K> {
  name: &'static str,
  inner: Arc<Mutex<Inner<T>>>,
  fetcher: Fetcher<T, K>,
  clock: SharedClock,
}

impl<T, K> Clone for Store<T, K> {
  fn clone(&self) -> Self {
    Self {
      name: self.name,
      inner: self.inner.clone(),
      fetcher: self.fetcher.clone(),
      clock: self.clock.clone(),
    }
  }
}

impl<T, K> Store<T, K>
where
  T: Clone + Serialize + DeserializeOwned + Send + 'static,
  K: QueryKey,
{
  pub fn new<F>(name: &'static str, ttl: Duration, clock: SharedClock, fetcher: F) -> Self
  where
    F: Fn(K) -> BoxFuture<'static, ApiResult<Resource<T>>> + Send + Sync + 'static,
  {
    Self {
      name,
      inner: Arc::new(Mutex::new(Inner {
        state: StoreState::default(),
        cache: QueryCache::new(ttl),
      })),
      fetcher: Arc::new(fetcher),
      clock,
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  fn lock(&self) -> MutexGuard<'_, Inner<T>> {
    // State stays consistent even if a holder panicked; each update is one assignment
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn dispatch(&self, action: StoreAction<T>) {
    let now = self.clock.now();
    reduce(&mut self.lock().state, action, now);
  }

  /// Load data for `key`, from the cache when a valid entry exists.
  ///
  /// Failures are recorded in the state's `error` and also returned; the
  /// cache is left untouched on failure.
  pub async fn fetch_data(&self, key: K) -> ApiResult<()> {
    let cache_key = key.cache_key();
    let started = self.clock.now();

    {
      let mut inner = self.lock();
      let cached = inner
        .cache
        .get_fresh(&cache_key, started)
        .map(|entry| entry.data.clone());
      if let Some(data) = cached {
        debug!(store = self.name, key = %cache_key, "cache hit");
        reduce(&mut inner.state, StoreAction::FetchSuccess(data), started);
        return Ok(());
      }
      debug!(store = self.name, key = %cache_key, "cache miss");
      reduce(&mut inner.state, StoreAction::FetchStart, started);
    }

    match (self.fetcher)(key).await {
      Ok(data) => {
        let now = self.clock.now();
        let mut inner = self.lock();
        inner.cache.insert(cache_key, data.clone(), started);
        reduce(&mut inner.state, StoreAction::FetchSuccess(data), now);
        Ok(())
      }
      Err(e) => {
        warn!(store = self.name, key = %cache_key, error = %e, "fetch failed");
        self.dispatch(StoreAction::FetchError(e.to_string()));
        Err(e)
      }
    }
  }

  /// Run [`Store::fetch_data`] in the background. The result lands in the
  /// shared state even if the caller is gone by then.
  pub fn spawn_fetch(&self, key: K) -> JoinHandle<()> {
    let store = self.clone();
    tokio::spawn(async move {
      // Already recorded in the state
      let _ = store.fetch_data(key).await;
    })
  }

  pub fn state(&self) -> StoreState<T> {
    self.lock().state.clone()
  }

  pub fn is_loading(&self) -> bool {
    self.lock().state.is_loading
  }

  pub fn error(&self) -> Option<String> {
    self.lock().state.error.clone()
  }

  /// List-shaped data, or empty when the state holds nothing or a single entity.
  pub fn items(&self) -> Vec<T> {
    self
      .lock()
      .state
      .data
      .as_ref()
      .and_then(Resource::as_slice)
      .map(<[T]>::to_vec)
      .unwrap_or_default()
  }

  /// Single entity loaded by a by-id key.
  pub fn item(&self) -> Option<T> {
    self
      .lock()
      .state
      .data
      .as_ref()
      .and_then(Resource::as_item)
      .cloned()
  }

  /// Find the list element whose `id_field` equals `id`.
  pub fn get_item(&self, id: impl Into<Value>, id_field: &str) -> Option<T> {
    let id = id.into();
    let inner = self.lock();
    inner
      .state
      .data
      .as_ref()
      .and_then(Resource::as_slice)?
      .iter()
      .find(|item| state::field_matches(*item, id_field, &id))
      .cloned()
  }

  /// [`Store::get_item`] on the `id` field.
  pub fn get_item_by_id(&self, id: u64) -> Option<T> {
    self.get_item(id, "id")
  }

  /// Shallow-merge `updates` into the matching list element.
  ///
  /// Only the live state changes; a cached copy keeps the old value until it expires.
  pub fn update_item(&self, id: impl Into<Value>, updates: Map<String, Value>, id_field: &str) {
    self.dispatch(StoreAction::UpdateItem {
      id: id.into(),
      updates,
      id_field: id_field.to_string(),
    });
  }

  pub fn set_data(&self, data: Resource<T>) {
    self.dispatch(StoreAction::SetData(data));
  }

  pub fn clear_data(&self) {
    self.dispatch(StoreAction::ClearData);
  }

  /// Remove cache entries that expired. Returns how many were dropped.
  pub fn sweep_expired(&self) -> usize {
    let now = self.clock.now();
    let removed = self.lock().cache.sweep(now);
    if removed > 0 {
      debug!(store = self.name, removed, "swept expired cache entries");
    }
    removed
  }

  /// Drop the cached response for `key` so the next fetch goes to the network.
  /// Used after a mutation changed what the backend would return.
  pub fn invalidate(&self, key: &K) {
    let cache_key = key.cache_key();
    if self.lock().cache.remove(&cache_key) {
      debug!(store = self.name, key = %cache_key, "invalidated cache entry");
    }
  }

  /// Forget both the state and every cached response.
  pub fn reset(&self) {
    let mut inner = self.lock();
    inner.cache.clear();
    inner.state = StoreState::default();
  }

  pub fn cached_entries(&self) -> usize {
    self.lock().cache.len()
  }

  /// 1-based page of the list data. Out-of-range pages are empty.
  pub fn page(&self, page: usize, size: usize) -> Vec<T> {
    paginate(&self.items(), page, size)
  }

  pub fn total_pages(&self, size: usize) -> usize {
    let inner = self.lock();
    match inner.state.data.as_ref().and_then(Resource::as_slice) {
      Some(items) if size > 0 => items.len().div_ceil(size),
      _ => 0,
    }
  }
}

/// 1-based slice of `items`.
pub fn paginate<T: Clone>(items: &[T], page: usize, size: usize) -> Vec<T> {
  if page == 0 || size == 0 {
    return Vec::new();
  }
  items
    .iter()
    .skip((page - 1).saturating_mul(size))
    .take(size)
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::ManualClock;
  use crate::error::ApiError;
  use chrono::{TimeZone, Utc};
  use futures::FutureExt;
  use serde::Deserialize;
  use serde_json::json;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Course {
    id: u64,
    title: String,
  }

  fn course(id: u64, title: &str) -> Course {
    Course {
      id,
      title: title.to_string(),
    }
  }

  fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap())
  }

  /// Store whose fetcher counts calls and returns two courses.
  fn counting_store(clock: &ManualClock) -> (Store<Course, CourseKey>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let store = Store::new(
      "courses",
      Duration::milliseconds(300_000),
      Arc::new(clock.clone()),
      move |key: CourseKey| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
          // Let concurrent callers interleave
          tokio::task::yield_now().await;
          Ok::<_, ApiError>(match key {
            CourseKey::All => Resource::Collection(vec![course(1, "Rust"), course(2, "Go")]),
            CourseKey::ById(id) => Resource::Item(course(id, "Single")),
          })
        }
        .boxed()
      },
    );
    (store, calls)
  }

  #[tokio::test]
  async fn test_same_key_within_ttl_hits_network_once() {
    let clock = clock();
    let (store, calls) = counting_store(&clock);

    store.fetch_data(CourseKey::ById(5)).await.unwrap();
    store.fetch_data(CourseKey::ById(5)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.item(), Some(course(5, "Single")));

    // A different key is a different entry
    store.fetch_data(CourseKey::All).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_ttl_boundary() {
    let clock = clock();
    let (store, calls) = counting_store(&clock);

    store.fetch_data(CourseKey::ById(5)).await.unwrap();
    clock.advance(Duration::milliseconds(299_999));
    store.fetch_data(CourseKey::ById(5)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    clock.advance(Duration::milliseconds(2));
    store.fetch_data(CourseKey::ById(5)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_sweep_removes_expired_entries() {
    let clock = clock();
    let (store, _) = counting_store(&clock);

    store.fetch_data(CourseKey::All).await.unwrap();
    assert_eq!(store.sweep_expired(), 0);

    clock.advance(Duration::milliseconds(300_001));
    assert_eq!(store.sweep_expired(), 1);
    assert_eq!(store.cached_entries(), 0);
    // Sweeping does not touch the published state
    assert_eq!(store.items().len(), 2);
  }

  #[tokio::test]
  async fn test_failure_sets_error_and_keeps_cache() {
    let clock = clock();
    let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = fail.clone();
    let store: Store<Course, CourseKey> = Store::new(
      "courses",
      Duration::seconds(60),
      Arc::new(clock.clone()),
      move |_key| {
        let fail = flag.load(Ordering::SeqCst);
        async move {
          if fail {
            Err(ApiError::Http {
              status: 500,
              message: "database unavailable".to_string(),
            })
          } else {
            Ok(Resource::Collection(vec![course(1, "Rust")]))
          }
        }
        .boxed()
      },
    );

    store.fetch_data(CourseKey::All).await.unwrap();
    fail.store(true, Ordering::SeqCst);
    clock.advance(Duration::seconds(61));

    let err = store.fetch_data(CourseKey::All).await.unwrap_err();
    assert_eq!(err.to_string(), "database unavailable");

    let state = store.state();
    assert_eq!(state.error.as_deref(), Some("database unavailable"));
    assert!(!state.is_loading);
    // Previous data stays visible and the stale entry is still there until swept
    assert_eq!(store.items(), vec![course(1, "Rust")]);
    assert_eq!(store.cached_entries(), 1);
  }

  #[tokio::test]
  async fn test_get_and_update_item() {
    let clock = clock();
    let (store, calls) = counting_store(&clock);
    store.fetch_data(CourseKey::All).await.unwrap();

    assert_eq!(store.get_item_by_id(2), Some(course(2, "Go")));
    assert_eq!(store.get_item("Rust", "title"), Some(course(1, "Rust")));
    assert_eq!(store.get_item_by_id(9), None);

    let mut updates = Map::new();
    updates.insert("title".to_string(), json!("Go 2"));
    store.update_item(2, updates, "id");
    assert_eq!(store.items(), vec![course(1, "Rust"), course(2, "Go 2")]);

    // The cache still holds the old list
    store.clear_data();
    store.fetch_data(CourseKey::All).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.get_item_by_id(2), Some(course(2, "Go")));
  }

  #[tokio::test]
  async fn test_get_item_on_single_entity_is_not_found() {
    let clock = clock();
    let (store, _) = counting_store(&clock);
    store.fetch_data(CourseKey::ById(3)).await.unwrap();
    assert_eq!(store.get_item_by_id(3), None);
  }

  #[tokio::test]
  async fn test_concurrent_fetches_both_reach_network() {
    let clock = clock();
    let (store, calls) = counting_store(&clock);

    let (a, b) = tokio::join!(
      store.fetch_data(CourseKey::All),
      store.fetch_data(CourseKey::All)
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.cached_entries(), 1);
  }

  #[tokio::test]
  async fn test_invalidate_forces_refetch_for_that_key_only() {
    let clock = clock();
    let (store, calls) = counting_store(&clock);

    store.fetch_data(CourseKey::All).await.unwrap();
    store.fetch_data(CourseKey::ById(1)).await.unwrap();
    store.invalidate(&CourseKey::All);
    assert_eq!(store.cached_entries(), 1);

    store.fetch_data(CourseKey::All).await.unwrap();
    store.fetch_data(CourseKey::ById(1)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[test]
  fn test_pagination() {
    let items: Vec<u32> = (1..=23).collect();
    assert_eq!(paginate(&items, 1, 10), (1..=10).collect::<Vec<_>>());
    assert_eq!(paginate(&items, 3, 10), vec![21, 22, 23]);
    assert!(paginate(&items, 4, 10).is_empty());
    assert!(paginate(&items, 0, 10).is_empty());
  }

  #[tokio::test]
  async fn test_total_pages() {
    let clock = clock();
    let (store, _) = counting_store(&clock);
    assert_eq!(store.total_pages(10), 0);

    store.set_data(Resource::Collection((1..=21).map(|i| course(i, "x")).collect()));
    assert_eq!(store.total_pages(10), 3);
    assert_eq!(store.page(3, 10), vec![course(21, "x")]);
  }
}
