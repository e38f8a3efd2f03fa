pub mod admin;
pub mod auth;
pub mod client;
pub mod monitoring;
pub mod student;
pub mod teacher;
pub mod types;
pub mod users;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use client::ApiClient;
pub use monitoring::{EventQuery, LogQuery, MonitoringApi};
pub use student::StudentApi;
pub use teacher::TeacherApi;
pub use users::UsersApi;

use chrono::Duration;

/// Every service of the backend over one shared client.
#[derive(Clone)]
pub struct Api {
  pub client: ApiClient,
  pub auth: AuthApi,
  pub admin: AdminApi,
  pub users: UsersApi,
  pub teacher: TeacherApi,
  pub student: StudentApi,
  pub monitoring: MonitoringApi,
}

impl Api {
  pub fn new(client: ApiClient, token_lifetime: Duration) -> Self {
    Self {
      auth: AuthApi::new(client.clone(), token_lifetime),
      admin: AdminApi::new(client.clone()),
      users: UsersApi::new(client.clone()),
      teacher: TeacherApi::new(client.clone()),
      student: StudentApi::new(client.clone()),
      monitoring: MonitoringApi::new(client.clone()),
      client,
    }
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use super::ApiClient;
  use crate::clock::system_clock;
  use crate::config::ApiConfig;
  use crate::session::SessionManager;
  use crate::storage::MemoryStorage;
  use std::sync::Arc;
  use wiremock::MockServer;

  /// Anonymous client pointed at a mock server.
  pub fn client_for(server: &MockServer) -> ApiClient {
    let session = Arc::new(SessionManager::init(
      Arc::new(MemoryStorage::new()),
      system_clock(),
    ));
    ApiClient::new(
      &ApiConfig {
        base_url: server.uri(),
        timeout_secs: 5,
      },
      session,
    )
    .unwrap()
  }
}
