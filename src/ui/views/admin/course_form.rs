use crate::api::types::{Course, CourseUpdateRequest};
use crate::error::ApiError;
use crate::query::Query;
use crate::store::CourseKey;
use crate::ui::components::{Form, FormEvent, FormField, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::poll_mutation;
use crate::ui::Context;
use crate::validation::validate_course;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use tracing::info;

/// Create a course, or edit one when an id is given.
pub struct CourseFormView {
  ctx: Context,
  id: Option<u64>,
  form: Form,
  prefilled: bool,
  submit: Option<Query<Course>>,
}

impl CourseFormView {
  pub fn new(ctx: Context, id: Option<u64>) -> Self {
    let title = match id {
      Some(id) => format!("Edit course #{}", id),
      None => "New course".to_string(),
    };
    let form = Form::new(
      title,
      vec![
        FormField::new("title", "Title"),
        FormField::new("description", "Description"),
        FormField::new("teacher_id", "Teacher ID").hint("numeric ID of the teaching user"),
      ],
    );
    if let Some(id) = id {
      ctx.stores.courses.spawn_fetch(CourseKey::ById(id));
    }
    Self {
      ctx,
      id,
      form,
      prefilled: id.is_none(),
      submit: None,
    }
  }

  /// Copy the loaded course into the form once it arrives
  fn prefill(&mut self) {
    let Some(id) = self.id else {
      return;
    };
    if self.prefilled {
      return;
    }
    let store = &self.ctx.stores.courses;
    match store.item().filter(|c| c.id == id) {
      Some(course) => {
        if !self.form.is_edited() {
          self.form.set_value("title", course.title);
          self.form.set_value("description", course.description);
          self.form.set_value("teacher_id", course.teacher_id.to_string());
        }
        self.prefilled = true;
      }
      None => {
        if let Some(error) = store.error().filter(|_| !store.is_loading()) {
          self.form.set_error_message(format!("Could not load course: {}", error));
          self.prefilled = true;
        }
      }
    }
  }

  fn submit(&mut self) {
    self.form.clear_messages();
    let request = match validate_course(
      self.form.value("title"),
      self.form.value("description"),
      self.form.value("teacher_id"),
    ) {
      Ok(request) => request,
      Err(e) => {
        self.form.set_error(&ApiError::from(e));
        return;
      }
    };

    self.form.set_submitting(true);
    let api = self.ctx.api.clone();
    let id = self.id;
    self.submit = Some(Query::started(move || {
      let api = api.clone();
      let request = request.clone();
      async move {
        match id {
          Some(id) => {
            let update = CourseUpdateRequest {
              title: Some(request.title),
              description: Some(request.description),
              teacher_id: Some(request.teacher_id),
            };
            api.admin.update_course(id, &update).await
          }
          None => api.admin.create_course(&request).await,
        }
      }
    }));
  }
}

impl View for CourseFormView {
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
      Some(Ok(course)) => {
        info!(course_id = course.id, "saved course");
        let courses = &self.ctx.stores.courses;
        courses.invalidate(&CourseKey::All);
        courses.invalidate(&CourseKey::ById(course.id));
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
    match self.id {
      Some(id) => format!("Course #{}", id),
      None => "New course".to_string(),
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "save").with_priority(10),
      ShortcutInfo::new("tab", "next field").with_priority(20),
      ShortcutInfo::new("esc", "cancel").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ui::views::testing::{context_for, settle};
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  #[tokio::test]
  async fn test_failed_course_load_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/courses/3"))
      .respond_with(
        ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "course not found"})),
      )
      .mount(&server)
      .await;

    let mut view = CourseFormView::new(context_for(&server), Some(3));
    settle(&mut view).await;

    assert_eq!(view.form.error(), Some("Could not load course: course not found"));
    assert!(view.prefilled);
  }
}
