use crate::api::types::UserData;
use crate::error::ApiError;
use crate::query::Query;
use crate::store::UserKey;
use crate::ui::components::{Form, FormEvent, FormField, KeyResult};
use crate::ui::renderfns::role_color;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::poll_mutation;
use crate::ui::Context;
use crate::validation::validate_user_update;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use tracing::{info, warn};

/// Edit the signed-in user's name, email and password.
pub struct ProfileView {
  ctx: Context,
  form: Form,
  /// Whether the form shows the backend's profile rather than the session copy
  synced: bool,
  submit: Option<Query<UserData>>,
}

impl ProfileView {
  pub fn new(ctx: Context) -> Self {
    let user = ctx.user();
    let mut name = FormField::new("name", "Name");
    let mut email = FormField::new("email", "Email");
    if let Some(user) = &user {
      name = name.value(user.name.clone());
      email = email.value(user.email.clone());
    }
    let form = Form::new(
      "My profile",
      vec![
        name,
        email,
        FormField::password("password", "New password").hint("leave empty to keep"),
      ],
    );
    ctx.stores.users.spawn_fetch(UserKey::Profile);
    Self {
      ctx,
      form,
      synced: false,
      submit: None,
    }
  }

  fn sync(&mut self) {
    if self.synced || self.form.is_edited() {
      return;
    }
    let username = self.ctx.user().map(|u| u.username);
    let profile = self
      .ctx
      .stores
      .users
      .item()
      .filter(|p| Some(&p.username) == username.as_ref());
    if let Some(profile) = profile {
      self.form.set_value("name", profile.name);
      self.form.set_value("email", profile.email);
      self.synced = true;
    }
  }

  fn submit(&mut self) {
    self.form.clear_messages();
    let update = match validate_user_update(
      self.form.value("name"),
      self.form.value("email"),
      self.form.value("password"),
      None,
    ) {
      Ok(update) => update,
      Err(e) => {
        self.form.set_error(&ApiError::from(e));
        return;
      }
    };

    self.form.set_submitting(true);
    let api = self.ctx.api.clone();
    self.submit = Some(Query::started(move || {
      let api = api.clone();
      let update = update.clone();
      async move { api.users.update_profile(&update).await }
    }));
  }
}

impl View for ProfileView {
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
    self.sync();
    match poll_mutation(&mut self.submit) {
      Some(Ok(user)) => {
        info!(user = %user.username, "updated profile");
        if let Err(e) = self.ctx.session.update_user(&user) {
          warn!(error = %e, "failed to store updated profile");
        }
        self.ctx.stores.users.invalidate(&UserKey::Profile);
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
    let [info_area, form_area] =
      Layout::vertical([Constraint::Length(1), Constraint::Min(5)]).areas(area);
    if let Some(user) = self.ctx.user() {
      let line = Line::from(vec![
        Span::styled(format!(" {}", user.username), Style::default().bold()),
        Span::raw("  "),
        Span::styled(user.role.clone(), Style::default().fg(role_color(&user.role))),
      ]);
      frame.render_widget(line, info_area);
    }
    self.form.render(frame, form_area);
  }

  fn breadcrumb_label(&self) -> String {
    "Profile".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "save").with_priority(10),
      ShortcutInfo::new("esc", "cancel").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::AuthResponse;
  use crate::ui::views::testing::{context_for, settle};
  use crossterm::event::{KeyCode, KeyModifiers};
  use wiremock::matchers::{body_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn profile(name: &str) -> serde_json::Value {
    serde_json::json!({
      "id": 2, "username": "tom", "name": name, "email": "tom@example.edu", "role": "teacher"
    })
  }

  #[tokio::test]
  async fn test_saved_profile_updates_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/profile"))
      .respond_with(ResponseTemplate::new(200).set_body_json(profile("Tom")))
      .mount(&server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/api/profile"))
      .and(body_json(serde_json::json!({"name": "Thomas", "email": "tom@example.edu"})))
      .respond_with(ResponseTemplate::new(200).set_body_json(profile("Thomas")))
      .expect(1)
      .mount(&server)
      .await;

    let ctx = context_for(&server);
    let auth = AuthResponse {
      token: "t".to_string(),
      user: serde_json::from_value(profile("Tom")).unwrap(),
    };
    ctx.session.begin(&auth, chrono::Duration::hours(1)).unwrap();

    let mut view = ProfileView::new(ctx.clone());
    settle(&mut view).await;
    assert_eq!(view.form.value("name"), "Tom");

    view.form.set_value("name", "Thomas");
    view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert_eq!(settle(&mut view).await, ViewAction::Back);
    assert_eq!(ctx.user().map(|u| u.name), Some("Thomas".to_string()));
  }
}
