use crate::api::types::{Assignment, AssignmentUpdateRequest};
use crate::error::ApiError;
use crate::query::Query;
use crate::store::AssignmentKey;
use crate::ui::components::{Form, FormEvent, FormField, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::poll_mutation;
use crate::ui::Context;
use crate::validation::validate_assignment;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use tracing::info;

/// What the form saves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentTarget {
  New { course_id: u64 },
  Edit(u64),
}

pub struct AssignmentFormView {
  ctx: Context,
  target: AssignmentTarget,
  form: Form,
  /// Course of the edited assignment, known once it has loaded
  course_id: Option<u64>,
  load_failed: bool,
  submit: Option<Query<Assignment>>,
}

impl AssignmentFormView {
  pub fn new(ctx: Context, target: AssignmentTarget) -> Self {
    let title = match target {
      AssignmentTarget::New { .. } => "New assignment".to_string(),
      AssignmentTarget::Edit(id) => format!("Edit assignment #{}", id),
    };
    let form = Form::new(
      title,
      vec![
        FormField::new("title", "Title"),
        FormField::new("description", "Description"),
        FormField::new("deadline", "Deadline").hint("2026-05-31 or 2026-05-31 18:00 (UTC)"),
        FormField::new("max_score", "Max score").value("100"),
      ],
    );

    let course_id = match target {
      AssignmentTarget::New { course_id } => Some(course_id),
      AssignmentTarget::Edit(id) => {
        ctx.stores.assignments.spawn_fetch(AssignmentKey::ById(id));
        None
      }
    };
    Self {
      ctx,
      target,
      form,
      course_id,
      load_failed: false,
      submit: None,
    }
  }

  fn prefill(&mut self) {
    let AssignmentTarget::Edit(id) = self.target else {
      return;
    };
    if self.course_id.is_some() || self.load_failed {
      return;
    }
    let store = &self.ctx.stores.assignments;
    match store.item().filter(|a| a.id == id) {
      Some(assignment) => {
        // Keep whatever the user typed while the load was in flight
        if !self.form.is_edited() {
          self.form.set_value("title", assignment.title);
          self.form.set_value("description", assignment.description);
          self.form.set_value("deadline", assignment.deadline);
          self.form.set_value("max_score", assignment.max_score.to_string());
        }
        self.course_id = Some(assignment.course_id);
      }
      None => {
        if let Some(error) = store.error().filter(|_| !store.is_loading()) {
          self.form.set_error_message(format!("Could not load assignment: {}", error));
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
    if self.course_id.is_none() {
      self.form.set_notice("Still loading the assignment, try again in a moment");
      return;
    }
    let request = match validate_assignment(
      self.form.value("title"),
      self.form.value("description"),
      self.form.value("deadline"),
      self.form.value("max_score"),
    ) {
      Ok(request) => request,
      Err(e) => {
        self.form.set_error(&ApiError::from(e));
        return;
      }
    };

    self.form.set_submitting(true);
    let api = self.ctx.api.clone();
    let target = self.target;
    self.submit = Some(Query::started(move || {
      let api = api.clone();
      let request = request.clone();
      async move {
        match target {
          AssignmentTarget::New { course_id } => {
            api.teacher.create_assignment(course_id, &request).await
          }
          AssignmentTarget::Edit(id) => {
            let update = AssignmentUpdateRequest {
              title: Some(request.title),
              description: Some(request.description),
              deadline: Some(request.deadline),
              max_score: Some(request.max_score),
            };
            api.teacher.update_assignment(id, &update).await
          }
        }
      }
    }));
  }
}

impl View for AssignmentFormView {
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
      Some(Ok(assignment)) => {
        info!(assignment_id = assignment.id, "saved assignment");
        let assignments = &self.ctx.stores.assignments;
        let course_id = self.course_id.unwrap_or(assignment.course_id);
        assignments.invalidate(&AssignmentKey::ByCourse(course_id));
        assignments.invalidate(&AssignmentKey::ById(assignment.id));
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
    match self.target {
      AssignmentTarget::New { .. } => "New assignment".to_string(),
      AssignmentTarget::Edit(id) => format!("Assignment #{}", id),
    }
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
  use crate::ui::views::testing::{context_for, settle};
  use crossterm::event::{KeyCode, KeyModifiers};
  use std::time::Duration;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[tokio::test]
  async fn test_failed_assignment_load_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/assignments/5"))
      .respond_with(
        ResponseTemplate::new(404)
          .set_body_json(serde_json::json!({"error": "assignment not found"})),
      )
      .mount(&server)
      .await;

    let mut view = AssignmentFormView::new(context_for(&server), AssignmentTarget::Edit(5));
    settle(&mut view).await;
    assert_eq!(
      view.form.error(),
      Some("Could not load assignment: assignment not found")
    );

    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| r.method.to_string() == "GET"));
  }

  #[tokio::test]
  async fn test_late_load_keeps_typed_input() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/assignments/5"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(serde_json::json!({
            "id": 5, "course_id": 2, "title": "Essay", "description": "Write",
            "deadline": "2026-05-31T00:00:00Z", "max_score": 20
          }))
          .set_delay(Duration::from_millis(50)),
      )
      .mount(&server)
      .await;

    let mut view = AssignmentFormView::new(context_for(&server), AssignmentTarget::Edit(5));
    view.handle_key(key(KeyCode::Char('X')));
    settle(&mut view).await;

    assert_eq!(view.form.value("title"), "X");
    assert_eq!(view.form.value("max_score"), "100");
    assert_eq!(view.course_id, Some(2));
  }

  #[tokio::test]
  async fn test_edit_prefills_untouched_form() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/assignments/5"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": 5, "course_id": 2, "title": "Essay", "max_score": 20
      })))
      .mount(&server)
      .await;

    let mut view = AssignmentFormView::new(context_for(&server), AssignmentTarget::Edit(5));
    settle(&mut view).await;

    assert_eq!(view.form.value("title"), "Essay");
    assert_eq!(view.form.value("max_score"), "20");
    assert_eq!(view.form.error(), None);
  }
}
