//! Time source shared by the session and the stores.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of the current time.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Shared handle to a clock.
pub type SharedClock = Arc<dyn Clock>;

pub fn system_clock() -> SharedClock {
  Arc::new(SystemClock)
}

#[cfg(test)]
pub use manual::ManualClock;
