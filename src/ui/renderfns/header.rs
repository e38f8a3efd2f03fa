use crate::api::types::UserData;
use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::utils::role_color;

/// Draw the header bar: app name, backend host, signed-in user, shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  base_url: &str,
  user: Option<&UserData>,
  shortcuts: &[ShortcutInfo],
) {
  let domain = extract_domain(base_url);

  let mut spans = vec![
    Span::styled(" smart-course ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", domain), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
  ];

  match user {
    Some(user) => {
      spans.push(Span::styled(
        format!(" {} ", user.display_name()),
        Style::default().fg(Color::Yellow).bold(),
      ));
      spans.push(Span::styled(
        format!("({}) ", user.role),
        Style::default().fg(role_color(&user.role)),
      ));
    }
    None => spans.push(Span::styled(" not signed in ", Style::default().fg(Color::DarkGray))),
  }
  spans.push(Span::raw(" "));

  let mut shortcuts = shortcuts.to_vec();
  shortcuts.sort_by_key(|s| s.priority);
  for shortcut in shortcuts {
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}   ", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host (and port) of the backend URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_domain() {
    assert_eq!(extract_domain("https://courses.example.edu"), "courses.example.edu");
    assert_eq!(extract_domain("https://api.school.org/v1"), "api.school.org");
    assert_eq!(extract_domain("http://localhost:8080"), "localhost:8080");
  }
}
