//! Login, registration and logout.

use chrono::Duration;
use tracing::info;

use super::client::ApiClient;
use super::types::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::ApiResult;
use crate::session::Session;

#[derive(Clone)]
pub struct AuthApi {
  client: ApiClient,
  token_lifetime: Duration,
}

impl AuthApi {
  pub fn new(client: ApiClient, token_lifetime: Duration) -> Self {
    Self {
      client,
      token_lifetime,
    }
  }

  /// Log in and start a session. Nothing is persisted unless the backend accepts.
  pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<Session> {
    let response: AuthResponse = self.client.post("/auth/login", credentials).await?;
    self
      .client
      .session()
      .begin(&response, self.token_lifetime)
  }

  /// Create an account. The user still has to log in afterwards.
  pub async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
    self.client.post_unit("/auth/register", request).await?;
    info!(username = %request.username, "registered account");
    Ok(())
  }

  pub fn logout(&self) {
    self.client.session().teardown();
  }
}
