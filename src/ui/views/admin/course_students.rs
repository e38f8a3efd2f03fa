use crate::api::types::CourseStudent;
use crate::error::ApiError;
use crate::query::Query;
use crate::ui::components::{
  Confirm, KeyResult, Listing, ListingEvent, ListingTable, Prompt, PromptEvent,
};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{poll_mutation, query_status, render_flash, with_status_line, Flash};
use crate::ui::Context;
use crate::validation::validate_student_id;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};
use tracing::info;

enum Change {
  Added(u64),
  Removed(u64),
}

/// Students enrolled in one course, with enrol/unenrol.
pub struct CourseStudentsView {
  ctx: Context,
  course_id: u64,
  students: Query<Vec<CourseStudent>>,
  listing: Listing,
  add: Prompt,
  confirm: Confirm,
  pending_remove: Option<u64>,
  change: Option<Change>,
  mutation: Option<Query<()>>,
  flash: Option<Flash>,
}

impl CourseStudentsView {
  pub fn new(ctx: Context, course_id: u64) -> Self {
    let api = ctx.api.clone();
    let students = Query::started(move || {
      let api = api.clone();
      async move { api.admin.course_students(course_id).await }
    });
    Self {
      listing: Listing::new(ctx.page_size),
      ctx,
      course_id,
      students,
      add: Prompt::new(),
      confirm: Confirm::default(),
      pending_remove: None,
      change: None,
      mutation: None,
      flash: None,
    }
  }

  fn rows(&self) -> &[CourseStudent] {
    self.students.data().map(Vec::as_slice).unwrap_or_default()
  }

  fn enrol(&mut self, value: &str) {
    let student_id = match validate_student_id(value) {
      Ok(id) => id,
      Err(e) => {
        self.flash = Some(ApiError::from(e).into());
        return;
      }
    };
    let api = self.ctx.api.clone();
    let course_id = self.course_id;
    self.change = Some(Change::Added(student_id));
    self.mutation = Some(Query::started(move || {
      let api = api.clone();
      async move { api.admin.add_student(course_id, student_id).await }
    }));
  }

  fn unenrol(&mut self, student_id: u64) {
    let api = self.ctx.api.clone();
    let course_id = self.course_id;
    self.change = Some(Change::Removed(student_id));
    self.mutation = Some(Query::started(move || {
      let api = api.clone();
      async move { api.admin.remove_student(course_id, student_id).await }
    }));
  }

  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.confirm.handle_key(key) {
      KeyResult::Event(confirmed) => {
        if let Some(student_id) = self.pending_remove.take().filter(|_| confirmed) {
          self.unenrol(student_id);
        }
        return Some(ViewAction::None);
      }
      KeyResult::Handled => return Some(ViewAction::None),
      KeyResult::NotHandled => {}
    }

    match self.add.handle_key(key) {
      KeyResult::Event(PromptEvent::Submitted(value)) => {
        self.enrol(&value);
        Some(ViewAction::None)
      }
      KeyResult::Event(PromptEvent::Cancelled) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let len = self.rows().len();
    match self.listing.handle_key(key, len) {
      // Nothing to open for a student row
      KeyResult::Event(ListingEvent::Activate(_)) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('a') => {
        self.add.open("Enrol student by ID", "");
        Some(ViewAction::None)
      }
      KeyCode::Char('d') => {
        let selected = self
          .listing
          .selected(self.rows().len())
          .and_then(|idx| self.rows().get(idx))
          .map(|s| (s.id, s.name.clone()));
        if let Some((student_id, name)) = selected {
          self.confirm.ask(format!("Remove {} from this course?", name));
          self.pending_remove = Some(student_id);
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('r') => {
        self.students.refetch();
        Some(ViewAction::None)
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Back),
      _ => None,
    }
  }
}

impl View for CourseStudentsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn tick(&mut self) -> ViewAction {
    self.students.poll();

    let Some(result) = poll_mutation(&mut self.mutation) else {
      return ViewAction::None;
    };
    match (self.change.take(), result) {
      (Some(Change::Added(id)), Ok(())) => {
        info!(course_id = self.course_id, student_id = id, "enrolled student");
        self.flash = Some(Flash::Info(format!("Enrolled student #{}", id)));
        self.students.refetch();
      }
      (Some(Change::Removed(id)), Ok(())) => {
        info!(course_id = self.course_id, student_id = id, "removed student");
        self.flash = Some(Flash::Info(format!("Removed student #{}", id)));
        self.students.refetch();
      }
      (None, Ok(())) => self.students.refetch(),
      (_, Err(e)) => self.flash = Some(e.into()),
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (main, status) = with_status_line(area);
    let rows: Vec<Row> = self
      .rows()
      .iter()
      .map(|s| {
        Row::new(vec![
          Cell::from(s.id.to_string()).style(Style::default().fg(Color::Cyan)),
          Cell::from(s.name.clone()),
          Cell::from(s.email.clone()).style(Style::default().fg(Color::DarkGray)),
        ])
      })
      .collect();

    let title = format!("Students of course #{}", self.course_id);
    self.listing.render(
      frame,
      main,
      ListingTable {
        title: &title,
        status: query_status(&self.students),
        header: vec!["ID", "Name", "Email"],
        widths: &[
          Constraint::Length(8),
          Constraint::Min(20),
          Constraint::Min(24),
        ],
        rows,
        empty_text: "No students enrolled. Press 'a' to add one.",
      },
    );
    render_flash(frame, status, self.flash.as_ref(), "a add  d remove  r reload");

    self.add.render_overlay(frame, main);
    self.confirm.render_overlay(frame, main);
  }

  fn breadcrumb_label(&self) -> String {
    "Students".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("a", "add").with_priority(10),
      ShortcutInfo::new("d", "remove").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
