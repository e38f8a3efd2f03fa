use crate::api::types::StudentAssignment;
use crate::query::Query;
use crate::ui::components::{KeyResult, Listing, ListingEvent, ListingTable};
use crate::ui::renderfns::{format_score, format_timestamp, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::query_status;
use crate::ui::Context;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Wrap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
  Graded,
  Submitted,
  Overdue,
  Open,
}

fn status(assignment: &StudentAssignment, now: DateTime<Utc>) -> Status {
  if assignment.grade.is_some() {
    return Status::Graded;
  }
  if assignment.is_completed {
    return Status::Submitted;
  }
  match DateTime::parse_from_rfc3339(&assignment.deadline) {
    Ok(deadline) if deadline < now => Status::Overdue,
    _ => Status::Open,
  }
}

fn status_cell(assignment: &StudentAssignment, now: DateTime<Utc>) -> Cell<'static> {
  match status(assignment, now) {
    Status::Graded => {
      let score = assignment
        .grade
        .as_ref()
        .map(|g| format!("{} / {}", format_score(g.score), assignment.max_score))
        .unwrap_or_default();
      Cell::from(score).style(Style::default().fg(Color::Green))
    }
    Status::Submitted => Cell::from("submitted").style(Style::default().fg(Color::Cyan)),
    Status::Overdue => Cell::from("overdue").style(Style::default().fg(Color::Red)),
    Status::Open => Cell::from("open").style(Style::default().fg(Color::Yellow)),
  }
}

/// Assignments of one enrolled course, with own results.
pub struct AssignmentsView {
  ctx: Context,
  course_id: u64,
  assignments: Query<Vec<StudentAssignment>>,
  listing: Listing,
}

impl AssignmentsView {
  pub fn new(ctx: Context, course_id: u64) -> Self {
    let api = ctx.api.clone();
    Self {
      assignments: Query::started(move || {
        let api = api.clone();
        async move { api.student.course_assignments(course_id).await }
      }),
      listing: Listing::new(ctx.page_size),
      ctx,
      course_id,
    }
  }

  fn rows(&self) -> &[StudentAssignment] {
    self.assignments.data().map(Vec::as_slice).unwrap_or_default()
  }
}

impl View for AssignmentsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    let len = self.rows().len();
    match self.listing.handle_key(key, len) {
      KeyResult::Event(ListingEvent::Activate(_)) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }
    match key.code {
      KeyCode::Char('r') => {
        self.assignments.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Back,
      _ => ViewAction::None,
    }
  }

  fn tick(&mut self) -> ViewAction {
    self.assignments.poll();
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let [table_area, detail_area] =
      Layout::vertical([Constraint::Min(5), Constraint::Length(7)]).areas(area);
    let now = self.ctx.now();

    let rows: Vec<Row> = self
      .rows()
      .iter()
      .map(|a| {
        Row::new(vec![
          Cell::from(truncate(&a.title, 40)),
          Cell::from(format_timestamp(&a.deadline)),
          Cell::from(a.max_score.to_string()),
          status_cell(a, now),
        ])
      })
      .collect();

    let title = format!("Assignments of course #{}", self.course_id);
    let query_state = query_status(&self.assignments);
    self.listing.render(
      frame,
      table_area,
      ListingTable {
        title: &title,
        status: query_state,
        header: vec!["Title", "Deadline", "Max", "Status"],
        widths: &[
          Constraint::Min(20),
          Constraint::Length(17),
          Constraint::Length(5),
          Constraint::Length(12),
        ],
        rows,
        empty_text: "No assignments in this course.",
      },
    );

    let selected = self
      .listing
      .selected(self.rows().len())
      .and_then(|idx| self.rows().get(idx));
    let lines = match selected {
      Some(a) => {
        let mut lines = vec![Line::raw(a.description.clone())];
        if let Some(grade) = a.grade.as_ref().filter(|g| !g.feedback.is_empty()) {
          lines.push(Line::raw(""));
          lines.push(Line::styled(
            format!("Feedback: {}", grade.feedback),
            Style::default().fg(Color::Green),
          ));
        }
        lines
      }
      None => vec![Line::styled("No assignment selected", Style::default().fg(Color::DarkGray))],
    };
    frame.render_widget(
      Paragraph::new(lines)
        .block(
          Block::default()
            .title(" Description ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: true }),
      detail_area,
    );
  }

  fn breadcrumb_label(&self) -> String {
    "Assignments".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("r", "reload").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
