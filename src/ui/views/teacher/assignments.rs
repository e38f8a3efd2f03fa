use crate::api::types::{Assignment, TeacherCourse};
use crate::query::Query;
use crate::router::Route;
use crate::store::AssignmentKey;
use crate::ui::components::{Confirm, KeyResult, Listing, ListingEvent, ListingTable};
use crate::ui::renderfns::{format_timestamp, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{poll_mutation, render_flash, store_status, with_status_line, Flash};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};
use tracing::info;

/// Assignments of one course the teacher owns.
pub struct AssignmentsView {
  ctx: Context,
  course_id: u64,
  course: Query<TeacherCourse>,
  listing: Listing,
  confirm: Confirm,
  pending_delete: Option<Assignment>,
  delete: Option<Query<()>>,
  flash: Option<Flash>,
}

impl AssignmentsView {
  pub fn new(ctx: Context, course_id: u64) -> Self {
    ctx.stores.assignments.spawn_fetch(AssignmentKey::ByCourse(course_id));
    let api = ctx.api.clone();
    let course = Query::started(move || {
      let api = api.clone();
      async move { api.teacher.course(course_id).await }
    });
    Self {
      listing: Listing::new(ctx.page_size),
      ctx,
      course_id,
      course,
      confirm: Confirm::default(),
      pending_delete: None,
      delete: None,
      flash: None,
    }
  }

  fn key(&self) -> AssignmentKey {
    AssignmentKey::ByCourse(self.course_id)
  }

  fn selected(&self) -> Option<Assignment> {
    let assignments = self.ctx.stores.assignments.items();
    self
      .listing
      .selected(assignments.len())
      .and_then(|idx| assignments.into_iter().nth(idx))
  }

  fn reload(&self) {
    self.ctx.stores.assignments.invalidate(&self.key());
    self.ctx.stores.assignments.spawn_fetch(self.key());
  }

  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.confirm.handle_key(key) {
      KeyResult::Event(true) => {
        if let Some(id) = self.pending_delete.as_ref().map(|a| a.id) {
          let api = self.ctx.api.clone();
          self.delete = Some(Query::started(move || {
            let api = api.clone();
            async move { api.teacher.delete_assignment(id).await }
          }));
        }
        Some(ViewAction::None)
      }
      KeyResult::Event(false) => {
        self.pending_delete = None;
        Some(ViewAction::None)
      }
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let assignments = self.ctx.stores.assignments.items();
    match self.listing.handle_key(key, assignments.len()) {
      KeyResult::Event(ListingEvent::Activate(idx)) => assignments
        .get(idx)
        .map(|a| ViewAction::Navigate(Route::TeacherAssignmentEdit(a.id).path())),
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('n') => Some(ViewAction::Navigate(
        Route::TeacherAssignmentNew {
          course_id: self.course_id,
        }
        .path(),
      )),
      KeyCode::Char('e') => self
        .selected()
        .map(|a| ViewAction::Navigate(Route::TeacherAssignmentEdit(a.id).path())),
      KeyCode::Char('g') => self
        .selected()
        .map(|a| ViewAction::Navigate(Route::TeacherGrades(a.id).path())),
      KeyCode::Char('d') => {
        if let Some(assignment) = self.selected() {
          self.confirm.ask(format!("Delete assignment '{}'?", assignment.title));
          self.pending_delete = Some(assignment);
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('r') => {
        self.reload();
        self.course.refetch();
        Some(ViewAction::None)
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Back),
      _ => None,
    }
  }
}

impl View for AssignmentsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn tick(&mut self) -> ViewAction {
    self.course.poll();
    match poll_mutation(&mut self.delete) {
      Some(Ok(())) => {
        if let Some(assignment) = self.pending_delete.take() {
          info!(assignment_id = assignment.id, "deleted assignment");
          self
            .ctx
            .stores
            .assignments
            .invalidate(&AssignmentKey::ById(assignment.id));
          self.flash = Some(Flash::Info(format!("Deleted '{}'", assignment.title)));
        }
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
    self.ctx.stores.assignments.spawn_fetch(self.key());
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (main, status) = with_status_line(area);
    let state = self.ctx.stores.assignments.state();
    let rows: Vec<Row> = self
      .ctx
      .stores
      .assignments
      .items()
      .into_iter()
      .map(|a| {
        Row::new(vec![
          Cell::from(a.id.to_string()).style(Style::default().fg(Color::Cyan)),
          Cell::from(truncate(&a.title, 40)),
          Cell::from(format_timestamp(&a.deadline)).style(Style::default().fg(Color::Yellow)),
          Cell::from(a.max_score.to_string()),
        ])
      })
      .collect();

    let title = match self.course.data() {
      Some(course) => format!("Assignments of {}", course.title),
      None => format!("Assignments of course #{}", self.course_id),
    };
    self.listing.render(
      frame,
      main,
      ListingTable {
        title: &title,
        status: store_status(&state),
        header: vec!["ID", "Title", "Deadline", "Max"],
        widths: &[
          Constraint::Length(6),
          Constraint::Min(20),
          Constraint::Length(17),
          Constraint::Length(5),
        ],
        rows,
        empty_text: "No assignments yet. Press 'n' to create one.",
      },
    );
    render_flash(
      frame,
      status,
      self.flash.as_ref(),
      "n new  e edit  g grades  d delete  r reload",
    );
    self.confirm.render_overlay(frame, main);
  }

  fn breadcrumb_label(&self) -> String {
    match self.course.data() {
      Some(course) => truncate(&course.title, 24),
      None => format!("Course #{}", self.course_id),
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("n", "new").with_priority(10),
      ShortcutInfo::new("g", "grades").with_priority(20),
      ShortcutInfo::new("d", "delete").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
