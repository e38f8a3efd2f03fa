use crate::api::types::TeacherCourse;
use crate::query::Query;
use crate::router::Route;
use crate::ui::components::{KeyResult, Listing, ListingEvent, ListingTable};
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::query_status;
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};

/// Courses taught by the signed-in teacher.
pub struct CoursesView {
  courses: Query<Vec<TeacherCourse>>,
  listing: Listing,
}

impl CoursesView {
  pub fn new(ctx: Context) -> Self {
    let api = ctx.api.clone();
    Self {
      courses: Query::started(move || {
        let api = api.clone();
        async move { api.teacher.courses().await }
      }),
      listing: Listing::new(ctx.page_size),
    }
  }

  fn rows(&self) -> &[TeacherCourse] {
    self.courses.data().map(Vec::as_slice).unwrap_or_default()
  }

  fn open(&self, idx: usize) -> Option<ViewAction> {
    self.rows().get(idx).map(|c| {
      ViewAction::Navigate(Route::TeacherAssignments { course_id: c.id }.path())
    })
  }
}

impl View for CoursesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    let len = self.rows().len();
    match self.listing.handle_key(key, len) {
      KeyResult::Event(ListingEvent::Activate(idx)) => {
        return self.open(idx).unwrap_or(ViewAction::None)
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('r') => {
        self.courses.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Back,
      _ => ViewAction::None,
    }
  }

  fn tick(&mut self) -> ViewAction {
    self.courses.poll();
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = self
      .rows()
      .iter()
      .map(|c| {
        Row::new(vec![
          Cell::from(c.id.to_string()).style(Style::default().fg(Color::Cyan)),
          Cell::from(truncate(&c.title, 40)),
          Cell::from(truncate(&c.description, 60)).style(Style::default().fg(Color::DarkGray)),
          Cell::from(c.students_count.to_string()).style(Style::default().fg(Color::Yellow)),
        ])
      })
      .collect();

    self.listing.render(
      frame,
      area,
      ListingTable {
        title: "My courses",
        status: query_status(&self.courses),
        header: vec!["ID", "Title", "Description", "Students"],
        widths: &[
          Constraint::Length(6),
          Constraint::Min(20),
          Constraint::Min(20),
          Constraint::Length(9),
        ],
        rows,
        empty_text: "You are not teaching any courses.",
      },
    );
  }

  fn breadcrumb_label(&self) -> String {
    "Courses".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "assignments").with_priority(10),
      ShortcutInfo::new("r", "reload").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
