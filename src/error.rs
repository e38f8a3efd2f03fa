//! Error types for the API, session and storage layers.

use crate::validation::ValidationError;

/// Errors surfaced by API calls and the stores built on them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
  /// Transport failure: connection refused, timeout, TLS, ...
  #[error("network error: {message}")]
  Network { message: String },

  /// Non-2xx response. `message` comes from the body's `error` or `message`
  /// field when the server sent one.
  #[error("{message}")]
  Http { status: u16, message: String },

  /// 401 from the backend. The session has already been torn down.
  #[error("unauthorized: {message}")]
  Unauthorized { message: String },

  /// The response body did not match the expected shape.
  #[error("invalid response: {message}")]
  Decode { message: String },

  /// Local persistent storage failed.
  #[error("storage error: {message}")]
  Storage { message: String },

  /// Form input rejected before submission.
  #[error(transparent)]
  Validation(#[from] ValidationError),
}

impl ApiError {
  /// Whether this error ends the current session.
  pub fn is_session_invalidating(&self) -> bool {
    matches!(self, Self::Unauthorized { .. })
  }

  /// HTTP status attached to the error, if any.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Http { status, .. } => Some(*status),
      Self::Unauthorized { .. } => Some(401),
      _ => None,
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      Self::Decode {
        message: err.to_string(),
      }
    } else {
      Self::Network {
        message: err.to_string(),
      }
    }
  }
}

impl From<rusqlite::Error> for ApiError {
  fn from(err: rusqlite::Error) -> Self {
    Self::Storage {
      message: err.to_string(),
    }
  }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_only_unauthorized_invalidates_session() {
    let unauthorized = ApiError::Unauthorized {
      message: "expired".to_string(),
    };
    let not_found = ApiError::Http {
      status: 404,
      message: "course not found".to_string(),
    };
    let network = ApiError::Network {
      message: "connection refused".to_string(),
    };

    assert!(unauthorized.is_session_invalidating());
    assert!(!not_found.is_session_invalidating());
    assert!(!network.is_session_invalidating());
  }

  #[test]
  fn test_http_error_displays_server_message() {
    let err = ApiError::Http {
      status: 400,
      message: "title is required".to_string(),
    };
    assert_eq!(err.to_string(), "title is required");
    assert_eq!(err.status(), Some(400));
  }

  #[test]
  fn test_validation_error_is_transparent() {
    let err: ApiError = ValidationError::new("title", "Course title is required").into();
    assert_eq!(err.to_string(), "Course title is required");
    assert_eq!(err.status(), None);
  }
}
