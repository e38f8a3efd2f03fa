use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::api::types::{Role, UserData};
use crate::api::Api;
use crate::clock::SharedClock;
use crate::session::SessionManager;
use crate::store::Stores;

/// Everything a view needs to talk to the backend.
#[derive(Clone)]
pub struct Context {
  pub api: Api,
  pub stores: Stores,
  pub session: Arc<SessionManager>,
  pub clock: SharedClock,
  /// Rows per page in table views
  pub page_size: usize,
}

impl Context {
  pub fn new(api: Api, stores: Stores, clock: SharedClock, page_size: usize) -> Self {
    let session = api.client.session().clone();
    Self {
      api,
      stores,
      session,
      clock,
      page_size: page_size.max(1),
    }
  }

  pub fn user(&self) -> Option<UserData> {
    self.session.user()
  }

  pub fn role(&self) -> Option<Role> {
    self.session.role()
  }

  pub fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  pub fn base_url(&self) -> &str {
    self.api.client.base_url()
  }
}
