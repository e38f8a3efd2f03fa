use crate::api::types::Course;
use crate::query::Query;
use crate::router::Route;
use crate::store::CourseKey;
use crate::ui::components::{
  Confirm, KeyResult, Listing, ListingEvent, ListingTable, Prompt, PromptEvent,
};
use crate::ui::renderfns::{format_timestamp, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{poll_mutation, render_flash, store_status, with_status_line, Flash};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};

/// All courses, backed by the courses store.
pub struct CoursesView {
  ctx: Context,
  listing: Listing,
  filter: Prompt,
  filter_text: String,
  confirm: Confirm,
  pending_delete: Option<Course>,
  delete: Option<Query<()>>,
  flash: Option<Flash>,
}

impl CoursesView {
  pub fn new(ctx: Context) -> Self {
    ctx.stores.courses.spawn_fetch(CourseKey::All);
    Self {
      listing: Listing::new(ctx.page_size),
      ctx,
      filter: Prompt::new(),
      filter_text: String::new(),
      confirm: Confirm::default(),
      pending_delete: None,
      delete: None,
      flash: None,
    }
  }

  /// Courses matching the title/teacher filter
  fn courses(&self) -> Vec<Course> {
    let needle = self.filter_text.to_lowercase();
    self
      .ctx
      .stores
      .courses
      .items()
      .into_iter()
      .filter(|c| {
        needle.is_empty()
          || c.title.to_lowercase().contains(&needle)
          || c.teacher_name.to_lowercase().contains(&needle)
      })
      .collect()
  }

  fn selected(&self) -> Option<Course> {
    let courses = self.courses();
    self
      .listing
      .selected(courses.len())
      .and_then(|idx| courses.into_iter().nth(idx))
  }

  fn reload(&mut self) {
    self.ctx.stores.courses.invalidate(&CourseKey::All);
    self.ctx.stores.courses.spawn_fetch(CourseKey::All);
  }

  fn start_delete(&mut self) {
    let Some(id) = self.pending_delete.as_ref().map(|c| c.id) else {
      return;
    };
    let api = self.ctx.api.clone();
    self.delete = Some(Query::started(move || {
      let api = api.clone();
      async move { api.admin.delete_course(id).await }
    }));
  }

  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.confirm.handle_key(key) {
      KeyResult::Event(true) => {
        self.start_delete();
        return Some(ViewAction::None);
      }
      KeyResult::Event(false) => {
        self.pending_delete = None;
        return Some(ViewAction::None);
      }
      KeyResult::Handled => return Some(ViewAction::None),
      KeyResult::NotHandled => {}
    }

    match self.filter.handle_key(key) {
      KeyResult::Event(PromptEvent::Submitted(text)) => {
        self.filter_text = text;
        self.listing.reset();
        Some(ViewAction::None)
      }
      KeyResult::Event(PromptEvent::Cancelled) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let courses = self.courses();
    match self.listing.handle_key(key, courses.len()) {
      KeyResult::Event(ListingEvent::Activate(idx)) => courses
        .get(idx)
        .map(|c| ViewAction::Navigate(Route::AdminCourseEdit(c.id).path())),
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('n') => Some(ViewAction::Navigate(Route::AdminCourseNew.path())),
      KeyCode::Char('e') => self
        .selected()
        .map(|c| ViewAction::Navigate(Route::AdminCourseEdit(c.id).path())),
      KeyCode::Char('s') => self
        .selected()
        .map(|c| ViewAction::Navigate(Route::AdminCourseStudents(c.id).path())),
      KeyCode::Char('d') => {
        if let Some(course) = self.selected() {
          self.confirm.ask(format!("Delete course '{}'?", course.title));
          self.pending_delete = Some(course);
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('/') => {
        self.filter.open("Filter by title or teacher", &self.filter_text);
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

impl View for CoursesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn tick(&mut self) -> ViewAction {
    match poll_mutation(&mut self.delete) {
      Some(Ok(())) => {
        if let Some(course) = self.pending_delete.take() {
          self.ctx.stores.courses.invalidate(&CourseKey::ById(course.id));
          self.flash = Some(Flash::Info(format!("Deleted course '{}'", course.title)));
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
    self.ctx.stores.courses.spawn_fetch(CourseKey::All);
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (main, status) = with_status_line(area);
    let state = self.ctx.stores.courses.state();
    let rows: Vec<Row> = self
      .courses()
      .into_iter()
      .map(|c| {
        Row::new(vec![
          Cell::from(c.id.to_string()).style(Style::default().fg(Color::Cyan)),
          Cell::from(truncate(&c.title, 40)),
          Cell::from(c.teacher_name.clone()).style(Style::default().fg(Color::Yellow)),
          Cell::from(format_timestamp(&c.updated_at)),
        ])
      })
      .collect();

    let title = if self.filter_text.is_empty() {
      "Courses".to_string()
    } else {
      format!("Courses matching '{}'", self.filter_text)
    };
    self.listing.render(
      frame,
      main,
      ListingTable {
        title: &title,
        status: store_status(&state),
        header: vec!["ID", "Title", "Teacher", "Updated"],
        widths: &[
          Constraint::Length(6),
          Constraint::Min(20),
          Constraint::Length(24),
          Constraint::Length(17),
        ],
        rows,
        empty_text: "No courses. Press 'n' to create one.",
      },
    );
    render_flash(
      frame,
      status,
      self.flash.as_ref(),
      "n new  e edit  s students  d delete  / filter  r reload",
    );

    self.filter.render_overlay(frame, main);
    self.confirm.render_overlay(frame, main);
  }

  fn breadcrumb_label(&self) -> String {
    "Courses".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("n", "new").with_priority(10),
      ShortcutInfo::new("s", "students").with_priority(20),
      ShortcutInfo::new("d", "delete").with_priority(30),
      ShortcutInfo::new("/", "filter").with_priority(40),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
