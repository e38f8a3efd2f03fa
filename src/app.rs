use crate::event::{Event, EventHandler};
use crate::router::{resolve, Access, Route};
use crate::ui::view::{View, ViewAction};
use crate::ui::{self, views, Context};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info};

const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// Routes that start a new navigation stack instead of being pushed
fn is_root(route: Route) -> bool {
  matches!(
    route,
    Route::Home
      | Route::Login
      | Route::Register
      | Route::NotFound
      | Route::AdminDashboard
      | Route::TeacherDashboard
      | Route::StudentDashboard
  )
}

/// Main application state
pub struct App {
  ctx: Context,

  /// Navigation stack. The first entry is always a root route.
  stack: Vec<(Route, Box<dyn View>)>,

  /// Shown in the footer until the next navigation
  message: Option<String>,

  tick_rate: Duration,
  should_quit: bool,
}

impl App {
  /// Open on the signed-in user's dashboard, or the login screen.
  pub fn new(ctx: Context, tick_rate: Duration) -> Self {
    let start = if ctx.session.is_authenticated() {
      ctx.role().map(Route::landing).unwrap_or(Route::Home)
    } else {
      Route::Login
    };
    let mut app = Self {
      ctx,
      stack: Vec::new(),
      message: None,
      tick_rate,
      should_quit: false,
    };
    app.navigate(&start.path());
    app
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(self.tick_rate);
    let result = self.event_loop(&mut terminal, &mut events).await;

    // Cleanup terminal, also after a failed draw
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.on_tick(),
      Event::Resize => {}
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }
    let action = match self.stack.last_mut() {
      Some((_, view)) => view.handle_key(key),
      None => ViewAction::Quit,
    };
    self.apply(action);
  }

  /// Poll the current view, sweep caches and enforce the session.
  fn on_tick(&mut self) {
    self.ctx.stores.sweep_expired();

    if let Some((_, view)) = self.stack.last_mut() {
      let action = view.tick();
      self.apply(action);
    }

    if self.ctx.session.take_invalidated() {
      self.ctx.stores.clear_all();
      // A rejected login already shows its own error
      if self.current_route() != Some(Route::Login) {
        self.redirect_to_login(SESSION_EXPIRED);
      }
      return;
    }

    let guarded = self
      .current_route()
      .is_some_and(|route| route.required_role().is_some());
    if guarded && !self.ctx.session.is_authenticated() {
      self.ctx.stores.clear_all();
      self.redirect_to_login(SESSION_EXPIRED);
    }
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Navigate(path) => self.navigate(&path),
      ViewAction::Back => self.back(),
      ViewAction::Logout => self.logout(),
      ViewAction::Quit => self.should_quit = true,
    }
  }

  /// Open `path` after applying route fallbacks and role guards.
  pub fn navigate(&mut self, path: &str) {
    let route = resolve(path, Access::of(&self.ctx.session));
    if route.path() != path {
      debug!(requested = path, resolved = %route, "redirected");
    }
    info!(route = %route, "navigate");

    self.message = None;
    let view = views::build(route, &self.ctx);
    if is_root(route) {
      self.stack.clear();
    }
    self.stack.push((route, view));
  }

  fn back(&mut self) {
    if self.stack.len() > 1 {
      self.stack.pop();
      if let Some((_, view)) = self.stack.last_mut() {
        view.resume();
      }
      return;
    }

    match self.current_route() {
      Some(Route::Register) => self.navigate(&Route::Login.path()),
      Some(Route::NotFound) => self.navigate(&Route::Home.path()),
      _ => self.should_quit = true,
    }
  }

  fn logout(&mut self) {
    info!("logging out");
    self.ctx.api.auth.logout();
    self.ctx.stores.clear_all();
    self.navigate(&Route::Login.path());
    self.message = Some("Signed out".to_string());
  }

  fn redirect_to_login(&mut self, message: &str) {
    self.navigate(&Route::Login.path());
    self.message = Some(message.to_string());
  }

  // Accessors for UI rendering
  pub fn context(&self) -> &Context {
    &self.ctx
  }

  pub fn current_route(&self) -> Option<Route> {
    self.stack.last().map(|(route, _)| *route)
  }

  pub fn current_view(&self) -> Option<&dyn View> {
    self.stack.last().map(|(_, view)| view.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.stack.last_mut().map(|(_, view)| view)
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .stack
      .iter()
      .map(|(_, view)| view.breadcrumb_label())
      .collect()
  }

  pub fn message(&self) -> Option<&str> {
    self.message.as_deref()
  }
}
