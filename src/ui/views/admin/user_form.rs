use crate::api::types::UserData;
use crate::error::ApiError;
use crate::query::Query;
use crate::store::UserKey;
use crate::ui::components::{Form, FormEvent, FormField, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::poll_mutation;
use crate::ui::Context;
use crate::validation::{validate_user, validate_user_update};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserTarget {
  New,
  Edit(u64),
}

/// Create an account, or change an existing one's details and role.
pub struct UserFormView {
  ctx: Context,
  target: UserTarget,
  form: Form,
  /// Username of the edited account, once loaded
  loaded: Option<String>,
  load_failed: bool,
  submit: Option<Query<UserData>>,
}

impl UserFormView {
  pub fn new(ctx: Context, target: UserTarget) -> Self {
    let form = match target {
      UserTarget::New => Form::new(
        "New user",
        vec![
          FormField::new("username", "Username"),
          FormField::new("name", "Name"),
          FormField::new("email", "Email"),
          FormField::password("password", "Password"),
          FormField::new("role", "Role")
            .hint("admin, teacher or student")
            .value("student"),
        ],
      ),
      UserTarget::Edit(id) => {
        ctx.stores.users.spawn_fetch(UserKey::ById(id));
        Form::new(
          format!("Edit user #{}", id),
          vec![
            FormField::new("name", "Name"),
            FormField::new("email", "Email"),
            FormField::password("password", "Password").hint("leave empty to keep"),
            FormField::new("role", "Role").hint("admin, teacher or student"),
          ],
        )
      }
    };
    Self {
      ctx,
      target,
      form,
      loaded: None,
      load_failed: false,
      submit: None,
    }
  }

  fn prefill(&mut self) {
    let UserTarget::Edit(id) = self.target else {
      return;
    };
    if self.loaded.is_some() || self.load_failed {
      return;
    }
    let store = &self.ctx.stores.users;
    match store.item().filter(|u| u.id == id) {
      Some(user) => {
        if !self.form.is_edited() {
          self.form.set_value("name", user.name);
          self.form.set_value("email", user.email);
          self.form.set_value("role", user.role);
        }
        self.loaded = Some(user.username);
      }
      None => {
        if let Some(error) = store.error().filter(|_| !store.is_loading()) {
          self.form.set_error_message(format!("Could not load user: {}", error));
          self.load_failed = true;
        }
      }
    }
  }

  fn submit(&mut self) {
    if self.load_failed {
      return;
    }
    self.form.clear_messages();
    let api = self.ctx.api.clone();
    let query = match self.target {
      UserTarget::New => {
        let request = match validate_user(
          self.form.value("username"),
          self.form.value("name"),
          self.form.value("email"),
          self.form.value("password"),
          self.form.value("role"),
        ) {
          Ok(request) => request,
          Err(e) => {
            self.form.set_error(&ApiError::from(e));
            return;
          }
        };
        Query::started(move || {
          let api = api.clone();
          let request = request.clone();
          async move { api.users.create_user(&request).await }
        })
      }
      UserTarget::Edit(id) => {
        if self.loaded.is_none() {
          self.form.set_notice("Still loading the user, try again in a moment");
          return;
        }
        let update = match validate_user_update(
          self.form.value("name"),
          self.form.value("email"),
          self.form.value("password"),
          Some(self.form.value("role")),
        ) {
          Ok(update) => update,
          Err(e) => {
            self.form.set_error(&ApiError::from(e));
            return;
          }
        };
        Query::started(move || {
          let api = api.clone();
          let update = update.clone();
          async move { api.users.update_user(id, &update).await }
        })
      }
    };
    self.form.set_submitting(true);
    self.submit = Some(query);
  }
}

impl View for UserFormView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
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
    self.prefill();
    match poll_mutation(&mut self.submit) {
      Some(Ok(user)) => {
        info!(user_id = user.id, role = %user.role, "saved user");
        let users = &self.ctx.stores.users;
        users.invalidate(&UserKey::All);
        users.invalidate(&UserKey::ById(user.id));
        ViewAction::Back
      }
      Some(Err(e)) => {
        self.form.set_submitting(false);
        self.form.set_error(&e);
        ViewAction::None
      }
      None => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.form.render(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    match (&self.target, &self.loaded) {
      (UserTarget::New, _) => "New user".to_string(),
      (UserTarget::Edit(_), Some(username)) => username.clone(),
      (UserTarget::Edit(id), None) => format!("User #{}", id),
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let save = match self.target {
      UserTarget::New => "create",
      UserTarget::Edit(_) => "save",
    };
    vec![
      ShortcutInfo::new("enter", save).with_priority(10),
      ShortcutInfo::new("tab", "next field").with_priority(20),
      ShortcutInfo::new("esc", "cancel").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ui::views::testing::{context_for, settle};
  use crossterm::event::{KeyCode, KeyModifiers};
  use wiremock::matchers::{body_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  #[tokio::test]
  async fn test_edit_sends_changed_fields_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/users/4"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": 4, "username": "ann", "name": "Ann", "email": "ann@example.edu", "role": "student"
      })))
      .mount(&server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/api/admin/users/4"))
      .and(body_json(serde_json::json!({
        "name": "Ann", "email": "ann@example.edu", "role": "teacher"
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": 4, "username": "ann", "name": "Ann", "email": "ann@example.edu", "role": "teacher"
      })))
      .expect(1)
      .mount(&server)
      .await;

    let mut view = UserFormView::new(context_for(&server), UserTarget::Edit(4));
    settle(&mut view).await;
    assert_eq!(view.form.value("role"), "student");
    assert_eq!(view.breadcrumb_label(), "ann");

    view.form.set_value("role", "teacher");
    view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert_eq!(settle(&mut view).await, ViewAction::Back);
  }
}
