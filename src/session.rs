//! Authenticated session with an explicit lifecycle.
//!
//! The session is created once at startup (`SessionManager::init`), handed to
//! everything that needs the token or the user's role, and torn down on logout,
//! on token expiry, or when the backend answers 401. Its persisted form lives
//! in [`LocalStorage`] under three fixed keys.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::api::types::{AuthResponse, Role, UserData};
use crate::clock::SharedClock;
use crate::error::{ApiError, ApiResult};
use crate::storage::LocalStorage;

pub const TOKEN_KEY: &str = "auth_token";
pub const TOKEN_EXPIRY_KEY: &str = "token_expiry";
pub const USER_KEY: &str = "userData";

/// Token lifetime assumed when the backend does not say.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// A logged-in user with their bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
  pub token: String,
  pub expires_at: DateTime<Utc>,
  pub user: UserData,
}

impl Session {
  fn is_expired(&self, now: DateTime<Utc>) -> bool {
    now > self.expires_at
  }
}

/// Owner of the current session and its persisted copy.
pub struct SessionManager {
  storage: Arc<dyn LocalStorage>,
  clock: SharedClock,
  current: RwLock<Option<Session>>,
  invalidated: AtomicBool,
}

impl SessionManager {
  /// Restore a persisted session.
  ///
  /// A session is restored only when token, unexpired expiry and a parseable
  /// profile are all present. Partial or stale leftovers are cleared.
  pub fn init(storage: Arc<dyn LocalStorage>, clock: SharedClock) -> Self {
    let manager = Self {
      storage,
      clock,
      current: RwLock::new(None),
      invalidated: AtomicBool::new(false),
    };

    match manager.load_persisted() {
      Ok(Some(session)) => {
        info!(user = %session.user.username, role = %session.user.role, "restored session");
        if let Ok(mut current) = manager.current.write() {
          *current = Some(session);
        }
      }
      Ok(None) => manager.clear_storage(),
      Err(e) => {
        warn!(error = %e, "failed to read persisted session");
        manager.clear_storage();
      }
    }

    manager
  }

  fn load_persisted(&self) -> ApiResult<Option<Session>> {
    let token = self.storage.get(TOKEN_KEY)?;
    let expiry = self.storage.get(TOKEN_EXPIRY_KEY)?;
    let user = self.storage.get(USER_KEY)?;

    let (Some(token), Some(expiry), Some(user)) = (token, expiry, user) else {
      return Ok(None);
    };

    let Some(expires_at) = expiry
      .trim()
      .parse::<i64>()
      .ok()
      .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    else {
      debug!(expiry = %expiry, "unparseable token expiry");
      return Ok(None);
    };

    let user: UserData = match serde_json::from_str(&user) {
      Ok(user) => user,
      Err(e) => {
        debug!(error = %e, "unparseable persisted profile");
        return Ok(None);
      }
    };

    let session = Session {
      token,
      expires_at,
      user,
    };
    if session.is_expired(self.clock.now()) {
      debug!("persisted token has expired");
      return Ok(None);
    }
    Ok(Some(session))
  }

  /// Start a session from a successful login and persist it.
  pub fn begin(&self, auth: &AuthResponse, lifetime: Duration) -> ApiResult<Session> {
    let session = Session {
      token: auth.token.clone(),
      expires_at: self.clock.now() + lifetime,
      user: auth.user.clone(),
    };

    let profile = serde_json::to_string(&session.user).map_err(|e| ApiError::Storage {
      message: format!("Failed to serialize profile: {}", e),
    })?;

    self.storage.set(TOKEN_KEY, &session.token)?;
    self.storage.set(
      TOKEN_EXPIRY_KEY,
      &session.expires_at.timestamp_millis().to_string(),
    )?;
    self.storage.set(USER_KEY, &profile)?;

    if let Ok(mut current) = self.current.write() {
      *current = Some(session.clone());
    }
    self.invalidated.store(false, Ordering::SeqCst);
    info!(user = %session.user.username, role = %session.user.role, "session started");

    Ok(session)
  }

  /// Replace the stored profile after the user edited it. No-op when signed out.
  pub fn update_user(&self, user: &UserData) -> ApiResult<()> {
    let Some(mut session) = self.current() else {
      return Ok(());
    };
    let profile = serde_json::to_string(user).map_err(|e| ApiError::Storage {
      message: format!("Failed to serialize profile: {}", e),
    })?;
    self.storage.set(USER_KEY, &profile)?;

    session.user = user.clone();
    if let Ok(mut current) = self.current.write() {
      *current = Some(session);
    }
    Ok(())
  }

  /// Current session if its token is still valid. An expired token ends the session.
  pub fn current(&self) -> Option<Session> {
    let session = self.current.read().ok()?.clone()?;
    if session.is_expired(self.clock.now()) {
      info!(user = %session.user.username, "token expired");
      self.teardown();
      return None;
    }
    Some(session)
  }

  /// Bearer token for outgoing requests.
  pub fn token(&self) -> Option<String> {
    self.current().map(|s| s.token)
  }

  pub fn user(&self) -> Option<UserData> {
    self.current().map(|s| s.user)
  }

  /// Role of the logged-in user. `None` when logged out or the role is unknown.
  pub fn role(&self) -> Option<Role> {
    self.user().and_then(|u| u.role())
  }

  pub fn is_authenticated(&self) -> bool {
    self.current().is_some()
  }

  /// End the session (logout or expiry) and clear its persisted copy.
  pub fn teardown(&self) {
    if let Ok(mut current) = self.current.write() {
      *current = None;
    }
    self.clear_storage();
  }

  /// End the session because the backend rejected the token.
  ///
  /// Raises a flag the app consumes to send the user back to the login screen.
  pub fn invalidate(&self) {
    warn!("session invalidated by the backend");
    self.teardown();
    self.invalidated.store(true, Ordering::SeqCst);
  }

  /// Returns `true` once after each `invalidate`.
  pub fn take_invalidated(&self) -> bool {
    self.invalidated.swap(false, Ordering::SeqCst)
  }

  fn clear_storage(&self) {
    for key in [TOKEN_KEY, TOKEN_EXPIRY_KEY, USER_KEY] {
      if let Err(e) = self.storage.remove(key) {
        warn!(key, error = %e, "failed to clear session key");
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::{Clock, ManualClock};
  use crate::storage::MemoryStorage;

  fn user(role: &str) -> UserData {
    UserData {
      id: 7,
      username: "alice".to_string(),
      name: "Alice".to_string(),
      email: "alice@example.com".to_string(),
      role: role.to_string(),
      created_at: String::new(),
      updated_at: String::new(),
    }
  }

  fn auth(role: &str) -> AuthResponse {
    AuthResponse {
      token: "tok-123".to_string(),
      user: user(role),
    }
  }

  fn hour() -> Duration {
    Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS)
  }

  fn setup() -> (Arc<MemoryStorage>, ManualClock) {
    (Arc::new(MemoryStorage::new()), ManualClock::new(Utc::now()))
  }

  #[test]
  fn test_begin_persists_all_keys() {
    let (storage, clock) = setup();
    let manager = SessionManager::init(storage.clone(), Arc::new(clock.clone()));

    manager.begin(&auth("teacher"), hour()).unwrap();

    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-123"));
    let expiry: i64 = storage.get(TOKEN_EXPIRY_KEY).unwrap().unwrap().parse().unwrap();
    assert_eq!(
      expiry,
      (clock.now() + hour()).timestamp_millis()
    );
    let profile: UserData =
      serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(profile, user("teacher"));
    assert_eq!(manager.role(), Some(Role::Teacher));
  }

  #[test]
  fn test_update_user_replaces_profile() {
    let (storage, clock) = setup();
    let manager = SessionManager::init(storage.clone(), Arc::new(clock.clone()));
    let mut renamed = user("student");
    renamed.name = "Alice B".to_string();

    // Signed out: nothing is written
    manager.update_user(&renamed).unwrap();
    assert_eq!(storage.get(USER_KEY).unwrap(), None);

    manager.begin(&auth("student"), hour()).unwrap();
    manager.update_user(&renamed).unwrap();
    assert_eq!(manager.user().map(|u| u.name), Some("Alice B".to_string()));
    let stored: UserData =
      serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored.name, "Alice B");
    assert_eq!(manager.token().as_deref(), Some("tok-123"));
  }

  #[test]
  fn test_init_restores_valid_session() {
    let (storage, clock) = setup();
    SessionManager::init(storage.clone(), Arc::new(clock.clone()))
      .begin(&auth("student"), hour())
      .unwrap();

    let restored = SessionManager::init(storage, Arc::new(clock));
    assert!(restored.is_authenticated());
    assert_eq!(restored.token().as_deref(), Some("tok-123"));
    assert_eq!(restored.role(), Some(Role::Student));
  }

  #[test]
  fn test_init_discards_expired_session() {
    let (storage, clock) = setup();
    SessionManager::init(storage.clone(), Arc::new(clock.clone()))
      .begin(&auth("admin"), Duration::seconds(60))
      .unwrap();

    clock.advance(Duration::seconds(61));
    let restored = SessionManager::init(storage.clone(), Arc::new(clock));

    assert!(!restored.is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_KEY).unwrap(), None);
  }

  #[test]
  fn test_init_discards_partial_state() {
    let (storage, clock) = setup();
    storage.set(TOKEN_KEY, "orphan").unwrap();

    let manager = SessionManager::init(storage.clone(), Arc::new(clock));

    assert!(!manager.is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
  }

  #[test]
  fn test_token_expires_while_running() {
    let (storage, clock) = setup();
    let manager = SessionManager::init(storage.clone(), Arc::new(clock.clone()));
    manager.begin(&auth("teacher"), Duration::minutes(10)).unwrap();

    clock.advance(Duration::minutes(9));
    assert!(manager.token().is_some());

    clock.advance(Duration::minutes(2));
    assert_eq!(manager.token(), None);
    assert_eq!(storage.get(TOKEN_EXPIRY_KEY).unwrap(), None);
  }

  #[test]
  fn test_teardown_clears_everything() {
    let (storage, clock) = setup();
    let manager = SessionManager::init(storage.clone(), Arc::new(clock));
    manager.begin(&auth("teacher"), hour()).unwrap();

    manager.teardown();

    assert!(!manager.is_authenticated());
    assert!(!manager.take_invalidated());
    for key in [TOKEN_KEY, TOKEN_EXPIRY_KEY, USER_KEY] {
      assert_eq!(storage.get(key).unwrap(), None);
    }
  }

  #[test]
  fn test_invalidate_raises_flag_once() {
    let (storage, clock) = setup();
    let manager = SessionManager::init(storage, Arc::new(clock));
    manager.begin(&auth("student"), hour()).unwrap();

    manager.invalidate();

    assert!(!manager.is_authenticated());
    assert!(manager.take_invalidated());
    assert!(!manager.take_invalidated());
  }
}
