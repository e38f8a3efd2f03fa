mod api;
mod app;
mod clock;
mod config;
mod error;
mod event;
mod logging;
mod query;
mod router;
mod session;
mod storage;
mod store;
mod ui;
mod validation;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::api::{Api, ApiClient};
use crate::session::SessionManager;
use crate::storage::{LocalStorage, SqliteStorage};
use crate::store::Stores;
use crate::ui::Context;

#[derive(Parser, Debug)]
#[command(name = "smart-course")]
#[command(about = "A terminal client for the Smart Course learning platform")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/smart-course/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Backend URL, overriding the config file
  #[arg(long)]
  api_url: Option<String>,

  /// Log filter, e.g. `debug` or `smart_course::store=trace` (default: $SMART_COURSE_LOG or info)
  #[arg(long)]
  log_level: Option<String>,

  /// Forget the stored session and exit
  #[arg(long)]
  logout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init(args.log_level.as_deref())?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(url) = args.api_url {
    config.api.base_url = url;
  }

  let storage: Arc<dyn LocalStorage> = Arc::new(match &config.session.storage_path {
    Some(path) => SqliteStorage::open(path)?,
    None => SqliteStorage::open_default()?,
  });
  let clock = clock::system_clock();
  let session = Arc::new(SessionManager::init(storage, clock.clone()));

  if args.logout {
    session.teardown();
    println!("Signed out.");
    return Ok(());
  }

  info!(base_url = %config.api.base_url, authenticated = session.is_authenticated(), "starting");

  let client = ApiClient::new(&config.api, session)?;
  let api = Api::new(client, config.session.token_lifetime());
  let stores = Stores::new(&api, &config.cache, clock.clone());
  let ctx = Context::new(api, stores, clock, config.ui.page_size);

  // Initialize and run the app
  let mut app = app::App::new(ctx, config.ui.tick_rate());
  app.run().await?;

  info!("exiting");
  Ok(())
}
