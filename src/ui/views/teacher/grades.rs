use crate::api::types::{Assignment, Grade};
use crate::query::Query;
use crate::router::Route;
use crate::store::GradeKey;
use crate::ui::components::{Confirm, KeyResult, Listing, ListingEvent, ListingTable};
use crate::ui::renderfns::{format_score, format_timestamp, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{poll_mutation, render_flash, store_status, with_status_line, Flash};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};
use tracing::info;

/// Grades handed out for one assignment, with their average.
pub struct GradesView {
  ctx: Context,
  assignment_id: u64,
  assignment: Query<Assignment>,
  listing: Listing,
  confirm: Confirm,
  pending_delete: Option<u64>,
  delete: Option<Query<()>>,
  flash: Option<Flash>,
}

impl GradesView {
  pub fn new(ctx: Context, assignment_id: u64) -> Self {
    ctx.stores.grades.spawn_fetch(GradeKey::ByAssignment(assignment_id));
    let api = ctx.api.clone();
    let assignment = Query::started(move || {
      let api = api.clone();
      async move { api.teacher.assignment(assignment_id).await }
    });
    Self {
      listing: Listing::new(ctx.page_size),
      ctx,
      assignment_id,
      assignment,
      confirm: Confirm::default(),
      pending_delete: None,
      delete: None,
      flash: None,
    }
  }

  fn key(&self) -> GradeKey {
    GradeKey::ByAssignment(self.assignment_id)
  }

  fn selected(&self) -> Option<Grade> {
    let grades = self.ctx.stores.grades.items();
    self
      .listing
      .selected(grades.len())
      .and_then(|idx| grades.into_iter().nth(idx))
  }

  fn reload(&self) {
    self.ctx.stores.grades.invalidate(&self.key());
    self.ctx.stores.grades.spawn_fetch(self.key());
  }

  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.confirm.handle_key(key) {
      KeyResult::Event(confirmed) => {
        match self.pending_delete.filter(|_| confirmed) {
          Some(id) => {
            let api = self.ctx.api.clone();
            self.delete = Some(Query::started(move || {
              let api = api.clone();
              async move { api.teacher.delete_grade(id).await }
            }));
          }
          None => self.pending_delete = None,
        }
        Some(ViewAction::None)
      }
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let grades = self.ctx.stores.grades.items();
    match self.listing.handle_key(key, grades.len()) {
      KeyResult::Event(ListingEvent::Activate(idx)) => grades
        .get(idx)
        .map(|g| ViewAction::Navigate(Route::TeacherGradeEdit(g.id).path())),
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('n') => Some(ViewAction::Navigate(
        Route::TeacherGradeNew(self.assignment_id).path(),
      )),
      KeyCode::Char('e') => self
        .selected()
        .map(|g| ViewAction::Navigate(Route::TeacherGradeEdit(g.id).path())),
      KeyCode::Char('d') => {
        if let Some(grade) = self.selected() {
          let who = grade
            .student_name
            .clone()
            .unwrap_or_else(|| format!("student #{}", grade.student_id));
          self.confirm.ask(format!("Delete the grade of {}?", who));
          self.pending_delete = Some(grade.id);
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('r') => {
        self.reload();
        Some(ViewAction::None)
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Back),
      _ => None,
    }
  }
}

impl View for GradesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn tick(&mut self) -> ViewAction {
    self.assignment.poll();
    match poll_mutation(&mut self.delete) {
      Some(Ok(())) => {
        if let Some(id) = self.pending_delete.take() {
          info!(grade_id = id, "deleted grade");
          self.ctx.stores.grades.invalidate(&GradeKey::ById(id));
        }
        self.flash = Some(Flash::Info("Grade deleted".to_string()));
        self.reload();
      }
      Some(Err(e)) => {
        self.pending_delete = None;
        self.flash = Some(e.into());
      }
      None => {}
    }
    ViewAction::None
  }

  fn resume(&mut self) {
    self.ctx.stores.grades.spawn_fetch(self.key());
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (main, status) = with_status_line(area);
    let state = self.ctx.stores.grades.state();
    let max_score = self.assignment.data().map(|a| a.max_score);
    let rows: Vec<Row> = self
      .ctx
      .stores
      .grades
      .items()
      .into_iter()
      .map(|g| {
        let student = g
          .student_name
          .clone()
          .unwrap_or_else(|| format!("#{}", g.student_id));
        let score = match max_score {
          Some(max) => format!("{} / {}", format_score(g.score), max),
          None => format_score(g.score),
        };
        Row::new(vec![
          Cell::from(student),
          Cell::from(score).style(Style::default().fg(Color::Green)),
          Cell::from(truncate(&g.feedback, 50)).style(Style::default().fg(Color::DarkGray)),
          Cell::from(format_timestamp(&g.updated_at)),
        ])
      })
      .collect();

    let average = self.ctx.stores.grade_average();
    let title = match self.assignment.data() {
      Some(a) => format!("Grades for {} (average {})", a.title, format_score(average)),
      None => format!("Grades (average {})", format_score(average)),
    };
    self.listing.render(
      frame,
      main,
      ListingTable {
        title: &title,
        status: store_status(&state),
        header: vec!["Student", "Score", "Feedback", "Updated"],
        widths: &[
          Constraint::Min(16),
          Constraint::Length(12),
          Constraint::Min(20),
          Constraint::Length(17),
        ],
        rows,
        empty_text: "No grades yet. Press 'n' to grade a student.",
      },
    );
    render_flash(frame, status, self.flash.as_ref(), "n new  e edit  d delete  r reload");
    self.confirm.render_overlay(frame, main);
  }

  fn breadcrumb_label(&self) -> String {
    match self.assignment.data() {
      Some(a) => format!("Grades: {}", truncate(&a.title, 20)),
      None => "Grades".to_string(),
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("n", "grade").with_priority(10),
      ShortcutInfo::new("e", "edit").with_priority(20),
      ShortcutInfo::new("d", "delete").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
