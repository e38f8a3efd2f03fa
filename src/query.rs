//! One-shot async calls driven by the UI tick.
//!
//! Stores cover cached resource collections. Everything else a view loads or
//! submits (a course detail, a form submission, a delete) runs through a
//! `Query<T>`: the view starts it, polls it on every tick, and renders from its
//! state.
//!
//! ```ignore
//! let api = ctx.api.clone();
//! let mut query = Query::new(move || {
//!     let api = api.clone();
//!     async move { api.student.grades().await }
//! });
//! query.fetch();
//!
//! // In tick()
//! query.poll();
//!
//! // In render()
//! match query.state() {
//!     QueryState::Loading => render_spinner(),
//!     QueryState::Success(grades) => render_grades(grades),
//!     QueryState::Error(e) => render_error(e),
//!     QueryState::Idle => {}
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

use crate::error::{ApiError, ApiResult};

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Not started yet
  Idle,
  Loading,
  Success(T),
  Error(ApiError),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&ApiError> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send>>;

type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Async call with loading, success and error states.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<ApiResult<T>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create an idle query. The fetcher runs on every `fetch()`/`refetch()`.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  /// Create a query and start it right away.
  pub fn started<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
  {
    let mut query = Self::new(fetcher);
    query.fetch();
    query
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  /// Consume the query, keeping only its state
  pub fn into_state(self) -> QueryState<T> {
    self.state
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn is_success(&self) -> bool {
    self.state.is_success()
  }

  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  pub fn error(&self) -> Option<&ApiError> {
    self.state.error()
  }

  /// Start fetching unless already loading.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Start again even if a fetch is in flight. The earlier result is ignored
  /// when it lands.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Back to `Idle`, dropping any pending result.
  pub fn reset(&mut self) {
    self.receiver = None;
    self.state = QueryState::Idle;
  }

  /// Pick up a finished fetch. Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Task panicked or was aborted before sending
        self.state = QueryState::Error(ApiError::Network {
          message: "request was cancelled".to_string(),
        });
        self.receiver = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      // Receiver may be gone if the view was closed
      let _ = tx.send(future.await);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok(vec![1, 2, 3]) });
    assert!(matches!(query.state(), QueryState::Idle));

    query.fetch();
    assert!(query.is_loading());

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(query.is_success());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error_keeps_api_error() {
    let mut query: Query<i32> = Query::started(|| async {
      Err(ApiError::Http {
        status: 409,
        message: "student already enrolled".to_string(),
      })
    });

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.error().and_then(ApiError::status), Some(409));
    assert_eq!(
      query.error().map(ToString::to_string).as_deref(),
      Some("student already enrolled")
    );
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(42)
      }
    });

    query.fetch();
    query.fetch();
    assert!(query.is_loading());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_refetch_ignores_earlier_result() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut query = Query::new(move || {
      let counter = counter_clone.clone();
      async move {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok(n)
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(5)).await;
    query.refetch();
    tokio::time::sleep(Duration::from_millis(80)).await;

    query.poll();
    assert_eq!(query.data(), Some(&1));
  }

  #[tokio::test]
  async fn test_reset() {
    let mut query = Query::started(|| async { Ok(()) });
    query.reset();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!query.poll());
    assert!(matches!(query.state(), QueryState::Idle));
  }
}
