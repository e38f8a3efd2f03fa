use crate::api::types::LoginRequest;
use crate::error::ApiError;
use crate::query::Query;
use crate::router::Route;
use crate::session::Session;
use crate::ui::components::{Form, FormEvent, FormField, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::poll_mutation;
use crate::ui::Context;
use crate::validation::validate_login;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use tracing::info;

pub struct LoginView {
  ctx: Context,
  form: Form,
  submit: Option<Query<Session>>,
}

impl LoginView {
  pub fn new(ctx: Context) -> Self {
    let form = Form::new(
      "Sign in",
      vec![
        FormField::new("username", "Username"),
        FormField::password("password", "Password"),
      ],
    );
    Self {
      ctx,
      form,
      submit: None,
    }
  }

  fn submit(&mut self) {
    self.form.clear_messages();
    let credentials = match validate_login(self.form.value("username"), self.form.value("password")) {
      Ok(credentials) => credentials,
      Err(e) => {
        self.form.set_error(&ApiError::from(e));
        return;
      }
    };

    self.form.set_submitting(true);
    let api = self.ctx.api.clone();
    self.submit = Some(Query::started(move || {
      let api = api.clone();
      let credentials: LoginRequest = credentials.clone();
      async move { api.auth.login(&credentials).await }
    }));
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
      return ViewAction::Navigate(Route::Register.path());
    }

    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submit) => {
        self.submit();
        ViewAction::None
      }
      KeyResult::Event(FormEvent::Cancel) => ViewAction::Back,
      KeyResult::Handled | KeyResult::NotHandled => ViewAction::None,
    }
  }

  fn tick(&mut self) -> ViewAction {
    match poll_mutation(&mut self.submit) {
      Some(Ok(session)) => {
        info!(user = %session.user.username, role = %session.user.role, "logged in");
        let target = session
          .user
          .role()
          .map(Route::landing)
          .unwrap_or(Route::Home);
        ViewAction::Navigate(target.path())
      }
      Some(Err(e)) => {
        // A rejected login stays here with the server's message
        self.form.set_submitting(false);
        self.form.set_error(&e);
        ViewAction::None
      }
      None => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let area = centered(area, 60, 12);
    self.form.render(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Login".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "sign in").with_priority(10),
      ShortcutInfo::new("ctrl-r", "register").with_priority(20),
      ShortcutInfo::new("esc", "quit").with_priority(90),
    ]
  }
}

/// Box of at most `width` x `height` centered in `area`
pub(super) fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  )
}
