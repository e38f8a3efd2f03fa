use crate::api::types::Role;
use crate::router::Route;
use crate::store::UserKey;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::role_color;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

struct MenuEntry {
  label: &'static str,
  description: &'static str,
  route: Route,
}

const fn entry(label: &'static str, description: &'static str, route: Route) -> MenuEntry {
  MenuEntry {
    label,
    description,
    route,
  }
}

fn menu(role: Role) -> Vec<MenuEntry> {
  match role {
    Role::Admin => vec![
      entry("Courses", "Create, edit and delete courses; manage enrolment", Route::AdminCourses),
      entry("Users", "Accounts of administrators, teachers and students", Route::AdminUsers),
      entry("Logs", "Backend log lines by level, source, text or date", Route::AdminLogs),
      entry("Events", "Audit trail of changes to courses, users and grades", Route::AdminEvents),
      entry("Metrics", "Current values of the backend's metrics", Route::AdminMetrics),
    ],
    Role::Teacher => vec![entry(
      "My courses",
      "Courses you teach, their assignments and grades",
      Route::TeacherCourses,
    )],
    Role::Student => vec![
      entry("My courses", "Courses you are enrolled in", Route::StudentCourses),
      entry("My grades", "Every grade you received, with your average", Route::StudentGrades),
    ],
  }
}

/// Menu of the sections available to one role, with the signed-in profile.
pub struct DashboardView {
  ctx: Context,
  role: Role,
  entries: Vec<MenuEntry>,
  list_state: ListState,
}

impl DashboardView {
  pub fn new(ctx: Context, role: Role) -> Self {
    ctx.stores.users.spawn_fetch(UserKey::Profile);
    Self {
      ctx,
      role,
      entries: menu(role),
      list_state: ListState::default(),
    }
  }

  fn render_profile(&self, frame: &mut Frame, area: Rect) {
    let users = &self.ctx.stores.users;
    // The profile endpoint is authoritative; the session copy is what login returned
    let profile = users.item().or_else(|| self.ctx.user());

    let mut lines = Vec::new();
    match profile {
      Some(user) => {
        lines.push(Line::from(vec![
          Span::styled(user.display_name().to_string(), Style::default().bold()),
          Span::raw("  "),
          Span::styled(user.role.clone(), Style::default().fg(role_color(&user.role))),
        ]));
        lines.push(Line::from(Span::styled(
          format!("{}  ·  {}", user.username, user.email),
          Style::default().fg(Color::DarkGray),
        )));
      }
      None => lines.push(Line::raw("Loading profile...")),
    }
    if let Some(error) = users.error() {
      lines.push(Line::from(Span::styled(
        format!("Profile: {}", error),
        Style::default().fg(Color::Red),
      )));
    }

    let block = Block::default()
      .title(" Profile ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    frame.render_widget(Paragraph::new(lines).block(block), area);
  }

  fn render_menu(&mut self, frame: &mut Frame, area: Rect) {
    ensure_valid_selection(&mut self.list_state, self.entries.len());

    let items: Vec<ListItem> = self
      .entries
      .iter()
      .map(|entry| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<12}", entry.label), Style::default().fg(Color::Cyan)),
          Span::styled(entry.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let title = match self.role {
      Role::Admin => " Administration ",
      Role::Teacher => " Teaching ",
      Role::Student => " Studies ",
    };
    let list = List::new(items)
      .block(
        Block::default()
          .title(title)
          .title_alignment(Alignment::Center)
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Blue)),
      )
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        ViewAction::None
      }
      KeyCode::Enter => self
        .list_state
        .selected()
        .and_then(|idx| self.entries.get(idx))
        .map(|entry| ViewAction::Navigate(entry.route.path()))
        .unwrap_or(ViewAction::None),
      KeyCode::Char('r') => {
        self.ctx.stores.users.invalidate(&UserKey::Profile);
        self.ctx.stores.users.spawn_fetch(UserKey::Profile);
        ViewAction::None
      }
      KeyCode::Char('p') => ViewAction::Navigate(Route::Profile(self.role).path()),
      KeyCode::Char('L') => ViewAction::Logout,
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Back,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let [profile_area, menu_area] =
      Layout::vertical([Constraint::Length(5), Constraint::Min(3)]).areas(area);
    self.render_profile(frame, profile_area);
    self.render_menu(frame, menu_area);
  }

  fn breadcrumb_label(&self) -> String {
    match self.role {
      Role::Admin => "Admin",
      Role::Teacher => "Teacher",
      Role::Student => "Student",
    }
    .to_string()
  }

  fn resume(&mut self) {
    self.ctx.stores.users.spawn_fetch(UserKey::Profile);
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "open").with_priority(10),
      ShortcutInfo::new("p", "profile").with_priority(15),
      ShortcutInfo::new("r", "refresh").with_priority(20),
      ShortcutInfo::new("L", "logout").with_priority(30),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_menus_only_link_routes_of_their_role() {
    for role in Role::ALL {
      for entry in menu(role) {
        assert_eq!(entry.route.required_role(), Some(role), "{}", entry.label);
      }
    }
  }
}
