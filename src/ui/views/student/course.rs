use crate::api::types::CourseDetail;
use crate::query::{Query, QueryState};
use crate::router::Route;
use crate::ui::renderfns::{format_score, format_timestamp};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};

/// One enrolled course with progress figures.
pub struct CourseView {
  course_id: u64,
  detail: Query<CourseDetail>,
}

impl CourseView {
  pub fn new(ctx: Context, course_id: u64) -> Self {
    let api = ctx.api.clone();
    Self {
      course_id,
      detail: Query::started(move || {
        let api = api.clone();
        async move { api.student.course(course_id).await }
      }),
    }
  }
}

/// Completed share of the assignments, 0 when there are none.
fn completion(detail: &CourseDetail) -> f64 {
  if detail.assignments_count == 0 {
    return 0.0;
  }
  (detail.completed_assignments_count as f64 / detail.assignments_count as f64).clamp(0.0, 1.0)
}

fn stat(label: &str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{:<22}", label), Style::default().fg(Color::DarkGray)),
    Span::styled(value, Style::default().bold()),
  ])
}

impl View for CourseView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('a') => ViewAction::Navigate(Route::StudentAssignments(self.course_id).path()),
      KeyCode::Char('g') => ViewAction::Navigate(Route::StudentGrades.path()),
      KeyCode::Char('r') => {
        self.detail.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Back,
      _ => ViewAction::None,
    }
  }

  fn tick(&mut self) -> ViewAction {
    self.detail.poll();
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let detail = match self.detail.state() {
      QueryState::Success(detail) => detail,
      QueryState::Error(e) => {
        let text = Paragraph::new(Line::styled(e.to_string(), Style::default().fg(Color::Red)))
          .block(block.title(" Course (error) "));
        frame.render_widget(text, area);
        return;
      }
      QueryState::Idle | QueryState::Loading => {
        frame.render_widget(
          Paragraph::new("Loading course...").block(block.title(" Course (loading...) ")),
          area,
        );
        return;
      }
    };

    let inner = block.inner(area);
    frame.render_widget(
      block.title(format!(" {} ", detail.course.title)),
      area,
    );
    let [about, stats, progress] = Layout::vertical([
      Constraint::Min(3),
      Constraint::Length(6),
      Constraint::Length(1),
    ])
    .areas(inner);

    let about_lines = vec![
      Line::from(vec![
        Span::styled("Teacher: ", Style::default().fg(Color::DarkGray)),
        Span::styled(detail.course.teacher_name.clone(), Style::default().fg(Color::Yellow)),
      ]),
      Line::raw(""),
      Line::raw(detail.course.description.clone()),
    ];
    frame.render_widget(Paragraph::new(about_lines).wrap(Wrap { trim: true }), about);

    let stat_lines = vec![
      stat("Lessons", detail.lessons_count.to_string()),
      stat("Assignments", detail.assignments_count.to_string()),
      stat(
        "Completed",
        format!(
          "{} / {}",
          detail.completed_assignments_count, detail.assignments_count
        ),
      ),
      stat("Average grade", format_score(detail.average_grade)),
      stat("Last updated", format_timestamp(&detail.course.updated_at)),
    ];
    frame.render_widget(Paragraph::new(stat_lines), stats);

    let ratio = completion(detail);
    frame.render_widget(
      Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio)
        .label(format!("{:.0}% complete", ratio * 100.0)),
      progress,
    );
  }

  fn breadcrumb_label(&self) -> String {
    match self.detail.data() {
      Some(detail) => detail.course.title.clone(),
      None => format!("Course #{}", self.course_id),
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("a", "assignments").with_priority(10),
      ShortcutInfo::new("g", "grades").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
