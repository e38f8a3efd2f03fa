use crate::error::ApiError;
use crate::query::Query;
use crate::router::Route;
use crate::ui::components::{Form, FormEvent, FormField, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::login::centered;
use crate::ui::views::poll_mutation;
use crate::ui::Context;
use crate::validation::{validate_register, MIN_PASSWORD_LEN};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

pub struct RegisterView {
  ctx: Context,
  form: Form,
  submit: Option<Query<()>>,
  registered: bool,
}

impl RegisterView {
  pub fn new(ctx: Context) -> Self {
    let form = Form::new(
      "Create account",
      vec![
        FormField::new("username", "Username"),
        FormField::new("email", "Email"),
        FormField::password("password", "Password")
          .hint(format!("at least {} characters", MIN_PASSWORD_LEN)),
      ],
    );
    Self {
      ctx,
      form,
      submit: None,
      registered: false,
    }
  }

  fn submit(&mut self) {
    self.form.clear_messages();
    let request = match validate_register(
      self.form.value("username"),
      self.form.value("email"),
      self.form.value("password"),
    ) {
      Ok(request) => request,
      Err(e) => {
        self.form.set_error(&ApiError::from(e));
        return;
      }
    };

    self.form.set_submitting(true);
    let api = self.ctx.api.clone();
    self.submit = Some(Query::started(move || {
      let api = api.clone();
      let request = request.clone();
      async move { api.auth.register(&request).await }
    }));
  }
}

impl View for RegisterView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.registered {
      return match key.code {
        KeyCode::Enter => ViewAction::Navigate(Route::Login.path()),
        KeyCode::Esc | KeyCode::Char('q') => ViewAction::Back,
        _ => ViewAction::None,
      };
    }
    if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
      return ViewAction::Navigate(Route::Login.path());
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
      Some(Ok(())) => {
        self.form.set_submitting(false);
        self.registered = true;
        self.form.set_notice("Account created. Press Enter to sign in.");
      }
      Some(Err(e)) => {
        self.form.set_submitting(false);
        self.form.set_error(&e);
      }
      None => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.form.render(frame, centered(area, 64, 14));
  }

  fn breadcrumb_label(&self) -> String {
    "Register".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "create").with_priority(10),
      ShortcutInfo::new("ctrl-l", "sign in").with_priority(20),
      ShortcutInfo::new("esc", "back").with_priority(90),
    ]
  }
}
