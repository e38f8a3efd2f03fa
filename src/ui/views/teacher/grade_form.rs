use crate::api::types::{Assignment, Grade, GradeUpdateRequest};
use crate::error::ApiError;
use crate::query::Query;
use crate::store::GradeKey;
use crate::ui::components::{Form, FormEvent, FormField, KeyResult};
use crate::ui::renderfns::format_score;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::poll_mutation;
use crate::ui::Context;
use crate::validation::{parse_score, validate_grade};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeTarget {
  New { assignment_id: u64 },
  Edit(u64),
}

/// Grade a student, or change an existing grade's score and feedback.
///
/// Scores are checked against the assignment's maximum, so nothing can be
/// submitted until the assignment has loaded.
pub struct GradeFormView {
  ctx: Context,
  target: GradeTarget,
  form: Form,
  assignment: Option<Query<Assignment>>,
  /// Grade being edited, once loaded
  grade: Option<Grade>,
  load_failed: bool,
  submit: Option<Query<Grade>>,
}

fn load_assignment(ctx: &Context, assignment_id: u64) -> Query<Assignment> {
  let api = ctx.api.clone();
  Query::started(move || {
    let api = api.clone();
    async move { api.teacher.assignment(assignment_id).await }
  })
}

impl GradeFormView {
  pub fn new(ctx: Context, target: GradeTarget) -> Self {
    let (form, assignment) = match target {
      GradeTarget::New { assignment_id } => (
        Form::new(
          "New grade",
          vec![
            FormField::new("student_id", "Student ID"),
            FormField::new("score", "Score"),
            FormField::new("feedback", "Feedback"),
          ],
        ),
        Some(load_assignment(&ctx, assignment_id)),
      ),
      GradeTarget::Edit(id) => {
        ctx.stores.grades.spawn_fetch(GradeKey::ById(id));
        (
          Form::new(
            format!("Edit grade #{}", id),
            vec![
              FormField::new("score", "Score"),
              FormField::new("feedback", "Feedback"),
            ],
          ),
          None,
        )
      }
    };
    Self {
      ctx,
      target,
      form,
      assignment,
      grade: None,
      load_failed: false,
      submit: None,
    }
  }

  fn max_score(&self) -> Option<u32> {
    self
      .assignment
      .as_ref()
      .and_then(Query::data)
      .map(|a| a.max_score)
  }

  fn prefill(&mut self) {
    let GradeTarget::Edit(id) = self.target else {
      return;
    };
    if self.grade.is_some() || self.load_failed {
      return;
    }
    let store = &self.ctx.stores.grades;
    match store.item().filter(|g| g.id == id) {
      Some(grade) => {
        if !self.form.is_edited() {
          self.form.set_value("score", format_score(grade.score));
          self.form.set_value("feedback", grade.feedback.clone());
        }
        self.assignment = Some(load_assignment(&self.ctx, grade.assignment_id));
        self.grade = Some(grade);
      }
      None => {
        if let Some(error) = store.error().filter(|_| !store.is_loading()) {
          self.form.set_error_message(format!("Could not load grade: {}", error));
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
    let Some(max_score) = self.max_score() else {
      match self.assignment.as_ref().and_then(Query::error) {
        Some(e) => self.form.set_error(e),
        None => self.form.set_notice("Still loading the assignment, try again in a moment"),
      }
      return;
    };

    let api = self.ctx.api.clone();
    let query = match self.target {
      GradeTarget::New { assignment_id } => {
        let request = match validate_grade(
          self.form.value("student_id"),
          self.form.value("score"),
          self.form.value("feedback"),
          max_score,
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
          async move { api.teacher.create_grade(assignment_id, &request).await }
        })
      }
      GradeTarget::Edit(id) => {
        let score = match parse_score(self.form.value("score"), max_score) {
          Ok(score) => score,
          Err(e) => {
            self.form.set_error(&ApiError::from(e));
            return;
          }
        };
        let update = GradeUpdateRequest {
          score: Some(score),
          feedback: Some(self.form.value("feedback").trim().to_string()),
        };
        Query::started(move || {
          let api = api.clone();
          let update = update.clone();
          async move { api.teacher.update_grade(id, &update).await }
        })
      }
    };
    self.form.set_submitting(true);
    self.submit = Some(query);
  }
}

impl View for GradeFormView {
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
    if let Some(assignment) = self.assignment.as_mut() {
      if assignment.poll() {
        if let Some(e) = assignment.error() {
          self.form.set_error(e);
        }
      }
    }

    match poll_mutation(&mut self.submit) {
      Some(Ok(grade)) => {
        info!(grade_id = grade.id, score = grade.score, "saved grade");
        let grades = &self.ctx.stores.grades;
        grades.invalidate(&GradeKey::ByAssignment(grade.assignment_id));
        grades.invalidate(&GradeKey::ById(grade.id));
        if let GradeTarget::New { assignment_id } = self.target {
          grades.invalidate(&GradeKey::ByAssignment(assignment_id));
        }
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

    let mut spans = Vec::new();
    if let Some(a) = self.assignment.as_ref().and_then(Query::data) {
      spans.push(Span::styled(format!(" {}", a.title), Style::default().bold()));
      spans.push(Span::styled(
        format!("  max score {}", a.max_score),
        Style::default().fg(Color::DarkGray),
      ));
    }
    if let Some(grade) = &self.grade {
      let who = grade
        .student_name
        .clone()
        .unwrap_or_else(|| format!("student #{}", grade.student_id));
      spans.push(Span::styled(format!("  {}", who), Style::default().fg(Color::Cyan)));
    }
    frame.render_widget(Line::from(spans), info_area);
    self.form.render(frame, form_area);
  }

  fn breadcrumb_label(&self) -> String {
    match self.target {
      GradeTarget::New { .. } => "New grade".to_string(),
      GradeTarget::Edit(id) => format!("Grade #{}", id),
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
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn enter() -> KeyEvent {
    KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)
  }

  #[tokio::test]
  async fn test_failed_grade_load_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/grades/9"))
      .respond_with(
        ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "grade not found"})),
      )
      .mount(&server)
      .await;

    let mut view = GradeFormView::new(context_for(&server), GradeTarget::Edit(9));
    settle(&mut view).await;
    assert_eq!(view.form.error(), Some("Could not load grade: grade not found"));

    // Nothing is sent for a grade that never loaded
    for _ in 0..3 {
      assert_eq!(view.handle_key(enter()), ViewAction::None);
    }
    settle(&mut view).await;
    assert_eq!(view.form.error(), Some("Could not load grade: grade not found"));
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| r.method.to_string() == "GET"));
  }

  #[tokio::test]
  async fn test_edit_prefills_from_loaded_grade() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/grades/9"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": 9, "assignment_id": 4, "student_id": 3, "score": 7, "feedback": "ok"
      })))
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/api/teacher/assignments/4"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": 4, "course_id": 1, "title": "Essay", "max_score": 10
      })))
      .mount(&server)
      .await;

    let mut view = GradeFormView::new(context_for(&server), GradeTarget::Edit(9));
    settle(&mut view).await;

    assert_eq!(view.form.value("score"), "7");
    assert_eq!(view.form.value("feedback"), "ok");
    assert_eq!(view.max_score(), Some(10));
    assert_eq!(view.form.error(), None);
  }
}
