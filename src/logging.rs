//! File logging. The terminal belongs to the TUI, so logs go to a daily file.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SMART_COURSE_LOG";
const LOG_FILE_PREFIX: &str = "smart-course.log";

/// Default log directory: $XDG_DATA_HOME/smart-course/logs
pub fn default_log_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir().ok_or_else(|| eyre!("Could not find data directory"))?;
  Ok(data_dir.join("smart-course").join("logs"))
}

/// Filter from `level` if given, else `SMART_COURSE_LOG`, else `info`.
fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
  match level {
    Some(level) => {
      EnvFilter::try_new(level).map_err(|e| eyre!("Invalid log level '{}': {}", level, e))
    }
    None => Ok(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))),
  }
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered lines get flushed.
pub fn init(level: Option<&str>) -> Result<WorkerGuard> {
  let dir = default_log_dir()?;
  std::fs::create_dir_all(&dir)?;

  let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(build_filter(level)?)
    .with_writer(writer)
    .with_ansi(false)
    .with_target(true)
    .try_init()
    .map_err(|e| eyre!("Failed to install logger: {}", e))?;

  Ok(guard)
}
