use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::DEFAULT_TOKEN_LIFETIME_SECS;

/// Upper bound for cache TTLs and the token lifetime: one year
pub const MAX_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub session: SessionConfig,
  #[serde(default)]
  pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Backend root, e.g. `http://localhost:8080`
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_base_url() -> String {
  "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

/// Time-to-live of each store's cache entries, in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub courses_ttl_secs: u64,
  pub assignments_ttl_secs: u64,
  pub grades_ttl_secs: u64,
  pub users_ttl_secs: u64,
  pub logs_ttl_secs: u64,
  pub events_ttl_secs: u64,
}

impl CacheConfig {
  fn entries(&self) -> [(&'static str, u64); 6] {
    [
      ("courses_ttl_secs", self.courses_ttl_secs),
      ("assignments_ttl_secs", self.assignments_ttl_secs),
      ("grades_ttl_secs", self.grades_ttl_secs),
      ("users_ttl_secs", self.users_ttl_secs),
      ("logs_ttl_secs", self.logs_ttl_secs),
      ("events_ttl_secs", self.events_ttl_secs),
    ]
  }
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      courses_ttl_secs: 300,
      assignments_ttl_secs: 300,
      grades_ttl_secs: 300,
      users_ttl_secs: 300,
      logs_ttl_secs: 120,
      events_ttl_secs: 180,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  /// Lifetime assumed for tokens issued at login
  pub token_lifetime_secs: i64,
  /// Where the session is persisted (default: $XDG_DATA_HOME/smart-course/storage.db)
  pub storage_path: Option<PathBuf>,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
      storage_path: None,
    }
  }
}

impl SessionConfig {
  pub fn token_lifetime(&self) -> chrono::Duration {
    chrono::Duration::seconds(self.token_lifetime_secs.clamp(1, MAX_LIFETIME_SECS as i64))
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
  /// Rows per page in table views
  pub page_size: usize,
  pub tick_rate_ms: u64,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      page_size: 10,
      tick_rate_ms: 250,
    }
  }
}

impl UiConfig {
  pub fn tick_rate(&self) -> Duration {
    Duration::from_millis(self.tick_rate_ms)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./smart-course.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/smart-course/config.yaml
  ///
  /// Without a file the built-in defaults are used. `SMART_COURSE_API_URL`
  /// overrides the backend URL either way.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var("SMART_COURSE_API_URL") {
      if !url.trim().is_empty() {
        config.api.base_url = url;
      }
    }

    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("smart-course.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("smart-course").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file is a valid, all-defaults config
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }

  fn validate(&self) -> Result<()> {
    if self.ui.page_size == 0 {
      return Err(eyre!("ui.page_size must be at least 1"));
    }
    if self.session.token_lifetime_secs <= 0 {
      return Err(eyre!("session.token_lifetime_secs must be positive"));
    }
    if self.session.token_lifetime_secs as u64 > MAX_LIFETIME_SECS {
      return Err(eyre!(
        "session.token_lifetime_secs must be at most {} (one year)",
        MAX_LIFETIME_SECS
      ));
    }
    for (name, secs) in self.cache.entries() {
      if secs > MAX_LIFETIME_SECS {
        return Err(eyre!("cache.{} must be at most {} (one year)", name, MAX_LIFETIME_SECS));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, "http://localhost:8080");
    assert_eq!(config.cache.courses_ttl_secs, 300);
    assert_eq!(config.cache.logs_ttl_secs, 120);
    assert_eq!(config.cache.events_ttl_secs, 180);
    assert_eq!(config.session.token_lifetime_secs, 3600);
    assert_eq!(config.ui.page_size, 10);
  }

  #[test]
  fn test_partial_yaml_keeps_defaults() {
    let config = Config::from_yaml(
      r#"
api:
  base_url: https://courses.example.edu
cache:
  logs_ttl_secs: 30
"#,
    )
    .unwrap();

    assert_eq!(config.api.base_url, "https://courses.example.edu");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.cache.logs_ttl_secs, 30);
    assert_eq!(config.cache.grades_ttl_secs, 300);
  }

  #[test]
  fn test_empty_file_is_default() {
    let config = Config::from_yaml("  \n").unwrap();
    assert_eq!(config.ui.tick_rate(), Duration::from_millis(250));
  }

  #[test]
  fn test_zero_page_size_rejected() {
    let mut config = Config::default();
    config.ui.page_size = 0;
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_lifetimes_bounded_to_a_year() {
    let config = Config::from_yaml("cache:\n  logs_ttl_secs: 100000000000000000\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("cache.logs_ttl_secs"));

    let mut config = Config::default();
    config.session.token_lifetime_secs = i64::MAX;
    assert!(config.validate().is_err());
    assert_eq!(
      config.session.token_lifetime(),
      chrono::Duration::seconds(MAX_LIFETIME_SECS as i64)
    );

    config.session.token_lifetime_secs = MAX_LIFETIME_SECS as i64;
    config.cache.courses_ttl_secs = MAX_LIFETIME_SECS;
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smart-course.yaml");
    std::fs::write(&path, "ui:\n  page_size: 25\n").unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.ui.page_size, 25);
  }
}
