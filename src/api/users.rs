//! User management (admin) and the caller's own profile.

use super::client::ApiClient;
use super::types::{UserCreateRequest, UserData, UserUpdateRequest};
use crate::error::ApiResult;

#[derive(Clone)]
pub struct UsersApi {
  client: ApiClient,
}

impl UsersApi {
  pub fn new(client: ApiClient) -> Self {
    Self { client }
  }

  pub async fn users(&self) -> ApiResult<Vec<UserData>> {
    self.client.get("/api/admin/users").await
  }

  pub async fn user(&self, id: u64) -> ApiResult<UserData> {
    self.client.get(&format!("/api/admin/users/{}", id)).await
  }

  pub async fn create_user(&self, request: &UserCreateRequest) -> ApiResult<UserData> {
    self.client.post("/api/admin/users", request).await
  }

  pub async fn update_user(&self, id: u64, request: &UserUpdateRequest) -> ApiResult<UserData> {
    self
      .client
      .put(&format!("/api/admin/users/{}", id), request)
      .await
  }

  pub async fn delete_user(&self, id: u64) -> ApiResult<()> {
    self.client.delete(&format!("/api/admin/users/{}", id)).await
  }

  /// Profile of whoever holds the current token.
  pub async fn profile(&self) -> ApiResult<UserData> {
    self.client.get("/api/profile").await
  }

  pub async fn update_profile(&self, request: &UserUpdateRequest) -> ApiResult<UserData> {
    self.client.put("/api/profile", request).await
  }
}
