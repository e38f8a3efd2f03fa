use crate::api::types::StudentGrade;
use crate::query::Query;
use crate::router::Route;
use crate::store::mean_score;
use crate::ui::components::{KeyResult, Listing, ListingEvent, ListingTable};
use crate::ui::renderfns::{format_score, format_timestamp, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::query_status;
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};

/// Every grade of the signed-in student.
pub struct GradesView {
  grades: Query<Vec<StudentGrade>>,
  listing: Listing,
}

impl GradesView {
  pub fn new(ctx: Context) -> Self {
    let api = ctx.api.clone();
    Self {
      grades: Query::started(move || {
        let api = api.clone();
        async move { api.student.grades().await }
      }),
      listing: Listing::new(ctx.page_size),
    }
  }

  fn rows(&self) -> &[StudentGrade] {
    self.grades.data().map(Vec::as_slice).unwrap_or_default()
  }
}

impl View for GradesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    let len = self.rows().len();
    match self.listing.handle_key(key, len) {
      KeyResult::Event(ListingEvent::Activate(idx)) => {
        return self
          .rows()
          .get(idx)
          .map(|g| ViewAction::Navigate(Route::StudentCourse(g.course_id).path()))
          .unwrap_or(ViewAction::None);
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }
    match key.code {
      KeyCode::Char('r') => {
        self.grades.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Back,
      _ => ViewAction::None,
    }
  }

  fn tick(&mut self) -> ViewAction {
    self.grades.poll();
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = self
      .rows()
      .iter()
      .map(|g| {
        Row::new(vec![
          Cell::from(truncate(&g.course_title, 24)).style(Style::default().fg(Color::Yellow)),
          Cell::from(truncate(&g.assignment_title, 32)),
          Cell::from(format!("{} / {}", format_score(g.score), g.max_score))
            .style(Style::default().fg(Color::Green)),
          Cell::from(truncate(&g.feedback, 40)).style(Style::default().fg(Color::DarkGray)),
          Cell::from(format_timestamp(&g.created_at)),
        ])
      })
      .collect();

    let average = mean_score(self.rows().iter().map(|g| g.score));
    let title = format!("My grades (average {})", format_score(average));
    self.listing.render(
      frame,
      area,
      ListingTable {
        title: &title,
        status: query_status(&self.grades),
        header: vec!["Course", "Assignment", "Score", "Feedback", "Graded"],
        widths: &[
          Constraint::Length(24),
          Constraint::Min(20),
          Constraint::Length(10),
          Constraint::Min(16),
          Constraint::Length(17),
        ],
        rows,
        empty_text: "No grades yet.",
      },
    );
  }

  fn breadcrumb_label(&self) -> String {
    "Grades".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "course").with_priority(10),
      ShortcutInfo::new("r", "reload").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
