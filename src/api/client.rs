//! HTTP client for the Smart Course backend.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionManager;

const USER_AGENT_VALUE: &str = concat!("smart-course/", env!("CARGO_PKG_VERSION"));

/// Thin JSON client: attaches the bearer token, maps error statuses, and
/// tears the session down when the backend answers 401.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: String,
  session: Arc<SessionManager>,
}

impl ApiClient {
  pub fn new(config: &ApiConfig, session: Arc<SessionManager>) -> ApiResult<Self> {
    // Validate early so a typo in the config fails at startup
    let parsed = Url::parse(&config.base_url).map_err(|e| ApiError::Network {
      message: format!("invalid base URL {}: {}", config.base_url, e),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(ApiError::Network {
        message: format!("unsupported URL scheme: {}", parsed.scheme()),
      });
    }

    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .default_headers(default_headers)
      .build()
      .map_err(|e| ApiError::Network {
        message: format!("failed to create HTTP client: {}", e),
      })?;

    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      session,
    })
  }

  pub fn session(&self) -> &Arc<SessionManager> {
    &self.session
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
    self.get_with_query(path, &[]).await
  }

  /// GET with URL-encoded query parameters.
  pub async fn get_with_query<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> ApiResult<T> {
    let body = self.send(Method::GET, path, query, None).await?;
    decode(path, &body)
  }

  pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    let body = self.send(Method::POST, path, &[], Some(to_json(body)?)).await?;
    decode(path, &body)
  }

  /// POST whose response body is ignored.
  pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
    self.send(Method::POST, path, &[], Some(to_json(body)?)).await?;
    Ok(())
  }

  pub async fn put<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    let body = self.send(Method::PUT, path, &[], Some(to_json(body)?)).await?;
    decode(path, &body)
  }

  /// DELETE; the response body, if any, is ignored.
  pub async fn delete(&self, path: &str) -> ApiResult<()> {
    self.send(Method::DELETE, path, &[], None).await?;
    Ok(())
  }

  async fn send(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, String)],
    body: Option<serde_json::Value>,
  ) -> ApiResult<Vec<u8>> {
    let url = format!("{}{}", self.base_url, path);
    debug!(method = %method, url = %url, "sending request");

    let mut request = self.http.request(method.clone(), &url);
    if !query.is_empty() {
      request = request.query(query);
    }
    if let Some(token) = self.session.token() {
      request = request.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(body) = body {
      request = request.json(&body);
    }

    let response = request.send().await.map_err(|e| {
      warn!(method = %method, url = %url, error = %e, "request failed");
      ApiError::from(e)
    })?;

    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
      debug!(method = %method, url = %url, status = status.as_u16(), "request succeeded");
      return Ok(bytes.to_vec());
    }

    let message = error_message(status, &bytes);
    warn!(method = %method, url = %url, status = status.as_u16(), error = %message, "request rejected");

    if status == StatusCode::UNAUTHORIZED {
      self.session.invalidate();
      return Err(ApiError::Unauthorized { message });
    }

    Err(ApiError::Http {
      status: status.as_u16(),
      message,
    })
  }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> ApiResult<serde_json::Value> {
  serde_json::to_value(body).map_err(|e| ApiError::Decode {
    message: format!("failed to encode request body: {}", e),
  })
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> ApiResult<T> {
  // Empty bodies decode as JSON null so `Option<T>` and `()` work
  let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
    b"null"
  } else {
    body
  };
  serde_json::from_slice(body).map_err(|e| ApiError::Decode {
    message: format!("{}: {}", path, e),
  })
}

/// Pick the user-facing message for an error response.
///
/// Prefers the body's `error` field, then `message`, then a generic text.
fn error_message(status: StatusCode, body: &[u8]) -> String {
  let from_body = serde_json::from_slice::<serde_json::Value>(body)
    .ok()
    .and_then(|value| {
      ["error", "message"].iter().find_map(|field| {
        value
          .get(field)
          .and_then(|v| v.as_str())
          .filter(|s| !s.trim().is_empty())
          .map(str::to_string)
      })
    });

  from_body.unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::{AuthResponse, Course, UserData};
  use crate::clock::system_clock;
  use crate::session::TOKEN_KEY;
  use crate::storage::{LocalStorage, MemoryStorage};
  use chrono::Duration as ChronoDuration;
  use wiremock::matchers::{body_json, header, method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn config(server: &MockServer) -> ApiConfig {
    ApiConfig {
      base_url: server.uri(),
      timeout_secs: 5,
    }
  }

  fn logged_in(storage: Arc<MemoryStorage>) -> Arc<SessionManager> {
    let session = SessionManager::init(storage, system_clock());
    session
      .begin(
        &AuthResponse {
          token: "test-token".to_string(),
          user: UserData {
            id: 1,
            username: "admin".to_string(),
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            role: "admin".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
          },
        },
        ChronoDuration::hours(1),
      )
      .unwrap();
    Arc::new(session)
  }

  fn anonymous() -> Arc<SessionManager> {
    Arc::new(SessionManager::init(
      Arc::new(MemoryStorage::new()),
      system_clock(),
    ))
  }

  #[test]
  fn test_error_message_precedence() {
    let status = StatusCode::BAD_REQUEST;
    assert_eq!(
      error_message(status, br#"{"error":"bad title","message":"ignored"}"#),
      "bad title"
    );
    assert_eq!(
      error_message(status, br#"{"message":"teacher not found"}"#),
      "teacher not found"
    );
    assert_eq!(
      error_message(status, b"<html>oops</html>"),
      "Request failed with status code 400"
    );
  }

  #[test]
  fn test_rejects_non_http_base_url() {
    let config = ApiConfig {
      base_url: "ftp://example.com".to_string(),
      timeout_secs: 5,
    };
    assert!(ApiClient::new(&config, anonymous()).is_err());
  }

  #[tokio::test]
  async fn test_get_attaches_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/courses"))
      .and(header("authorization", "Bearer test-token"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
        {"id": 1, "title": "Rust", "description": "Systems", "teacher_id": 2}
      ])))
      .expect(1)
      .mount(&server)
      .await;

    let client = ApiClient::new(&config(&server), logged_in(Arc::new(MemoryStorage::new()))).unwrap();
    let courses: Vec<Course> = client.get("/api/admin/courses").await.unwrap();

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].title, "Rust");
  }

  #[tokio::test]
  async fn test_query_parameters_are_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/logs"))
      .and(query_param("search", "disk full & more"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
      .expect(1)
      .mount(&server)
      .await;

    let client = ApiClient::new(&config(&server), anonymous()).unwrap();
    let logs: Vec<serde_json::Value> = client
      .get_with_query("/api/admin/logs", &[("search", "disk full & more".to_string())])
      .await
      .unwrap();
    assert!(logs.is_empty());
  }

  #[tokio::test]
  async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/admin/courses/4/students"))
      .and(body_json(serde_json::json!({"student_id": 12})))
      .respond_with(ResponseTemplate::new(201))
      .expect(1)
      .mount(&server)
      .await;

    let client = ApiClient::new(&config(&server), anonymous()).unwrap();
    client
      .post_unit(
        "/api/admin/courses/4/students",
        &serde_json::json!({"student_id": 12}),
      )
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn test_http_error_uses_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/api/admin/courses/9"))
      .respond_with(
        ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "course not found"})),
      )
      .mount(&server)
      .await;

    let storage = Arc::new(MemoryStorage::new());
    let session = logged_in(storage.clone());
    let client = ApiClient::new(&config(&server), session.clone()).unwrap();
    let err = client
      .put::<Course, _>("/api/admin/courses/9", &serde_json::json!({"title": "x"}))
      .await
      .unwrap_err();

    assert!(matches!(err, ApiError::Http { status: 404, ref message } if message == "course not found"));
    // Non-401 errors leave the session alone
    assert!(session.is_authenticated());
    assert!(storage.get(TOKEN_KEY).unwrap().is_some());
  }

  #[tokio::test]
  async fn test_unauthorized_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/profile"))
      .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "token expired"})))
      .mount(&server)
      .await;

    let storage = Arc::new(MemoryStorage::new());
    let session = logged_in(storage.clone());
    let client = ApiClient::new(&config(&server), session.clone()).unwrap();
    let err = client.get::<UserData>("/api/profile").await.unwrap_err();

    assert!(err.is_session_invalidating());
    assert_eq!(err.to_string(), "unauthorized: token expired");
    assert!(!session.is_authenticated());
    assert!(session.take_invalidated());
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
  }

  #[tokio::test]
  async fn test_network_failure_is_reported() {
    // Nothing listens on this port once the listener is dropped
    let port = {
      let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
      listener.local_addr().unwrap().port()
    };
    let config = ApiConfig {
      base_url: format!("http://127.0.0.1:{}", port),
      timeout_secs: 2,
    };

    let client = ApiClient::new(&config, anonymous()).unwrap();
    let err = client.get::<Vec<Course>>("/api/admin/courses").await.unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
  }

  #[tokio::test]
  async fn test_delete_ignores_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .and(path("/api/admin/courses/3"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "deleted"})),
      )
      .expect(1)
      .mount(&server)
      .await;

    let client = ApiClient::new(&config(&server), anonymous()).unwrap();
    client.delete("/api/admin/courses/3").await.unwrap();
  }
}
