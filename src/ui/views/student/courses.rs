use crate::api::types::StudentCourse;
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

pub struct CoursesView {
  courses: Query<Vec<StudentCourse>>,
  listing: Listing,
}

impl CoursesView {
  pub fn new(ctx: Context) -> Self {
    let api = ctx.api.clone();
    Self {
      courses: Query::started(move || {
        let api = api.clone();
        async move { api.student.courses().await }
      }),
      listing: Listing::new(ctx.page_size),
    }
  }

  fn rows(&self) -> &[StudentCourse] {
    self.courses.data().map(Vec::as_slice).unwrap_or_default()
  }

  fn selected_id(&self) -> Option<u64> {
    self
      .listing
      .selected(self.rows().len())
      .and_then(|idx| self.rows().get(idx))
      .map(|c| c.id)
  }
}

impl View for CoursesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    let len = self.rows().len();
    match self.listing.handle_key(key, len) {
      KeyResult::Event(ListingEvent::Activate(idx)) => {
        return self
          .rows()
          .get(idx)
          .map(|c| ViewAction::Navigate(Route::StudentCourse(c.id).path()))
          .unwrap_or(ViewAction::None);
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('a') => self
        .selected_id()
        .map(|id| ViewAction::Navigate(Route::StudentAssignments(id).path()))
        .unwrap_or(ViewAction::None),
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
          Cell::from(truncate(&c.title, 40)).style(Style::default().bold()),
          Cell::from(c.teacher_name.clone()).style(Style::default().fg(Color::Yellow)),
          Cell::from(truncate(&c.description, 60)).style(Style::default().fg(Color::DarkGray)),
        ])
      })
      .collect();

    self.listing.render(
      frame,
      area,
      ListingTable {
        title: "My courses",
        status: query_status(&self.courses),
        header: vec!["Course", "Teacher", "Description"],
        widths: &[
          Constraint::Min(20),
          Constraint::Length(20),
          Constraint::Min(20),
        ],
        rows,
        empty_text: "You are not enrolled in any course.",
      },
    );
  }

  fn breadcrumb_label(&self) -> String {
    "Courses".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "details").with_priority(10),
      ShortcutInfo::new("a", "assignments").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
