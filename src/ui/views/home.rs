use crate::router::Route;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Landing page. Signed-in users are pointed at their dashboard.
pub struct HomeView {
  ctx: Context,
}

impl HomeView {
  pub fn new(ctx: Context) -> Self {
    Self { ctx }
  }

  fn dashboard(&self) -> Option<Route> {
    self.ctx.role().map(Route::landing)
  }
}

impl View for HomeView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    let signed_in = self.ctx.session.is_authenticated();
    match key.code {
      KeyCode::Enter => match self.dashboard() {
        Some(route) => ViewAction::Navigate(route.path()),
        None => ViewAction::Navigate(Route::Login.path()),
      },
      KeyCode::Char('r') if !signed_in => ViewAction::Navigate(Route::Register.path()),
      KeyCode::Char('L') if signed_in => ViewAction::Logout,
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Back,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
      Line::from(Span::styled(
        "Smart Course",
        Style::default().fg(Color::Cyan).bold(),
      )),
      Line::raw(""),
      Line::raw("Courses, assignments and grades for administrators, teachers and students."),
      Line::raw(""),
    ];

    match (self.ctx.user(), self.dashboard()) {
      (Some(user), Some(_)) => {
        lines.push(Line::raw(format!(
          "Signed in as {} ({}).",
          user.display_name(),
          user.role
        )));
        lines.push(Line::raw("Press Enter to open your dashboard, L to sign out."));
      }
      (Some(user), None) => {
        // Profile with a role this client has no screens for
        lines.push(Line::from(Span::styled(
          format!(
            "Signed in as {}, but the role '{}' has no dashboard here.",
            user.display_name(),
            user.role
          ),
          Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::raw("Press L to sign out."));
      }
      (None, _) => {
        lines.push(Line::raw("Press Enter to sign in, r to create an account."));
      }
    }

    let paragraph = Paragraph::new(lines)
      .block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Blue)),
      )
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Home".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.ctx.session.is_authenticated() {
      vec![
        ShortcutInfo::new("enter", "dashboard").with_priority(10),
        ShortcutInfo::new("L", "logout").with_priority(20),
        ShortcutInfo::new("q", "quit").with_priority(90),
      ]
    } else {
      vec![
        ShortcutInfo::new("enter", "login").with_priority(10),
        ShortcutInfo::new("r", "register").with_priority(20),
        ShortcutInfo::new("q", "quit").with_priority(90),
      ]
    }
  }
}

pub struct NotFoundView;

impl View for NotFoundView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Enter => ViewAction::Navigate(Route::Home.path()),
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Back,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let lines = vec![
      Line::from(Span::styled("404", Style::default().fg(Color::Red).bold())),
      Line::raw(""),
      Line::raw("This page does not exist."),
      Line::raw("Press Enter to go home."),
    ];
    let paragraph = Paragraph::new(lines)
      .block(Block::default().borders(Borders::ALL))
      .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Not found".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "home").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
