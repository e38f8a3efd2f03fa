use chrono::{DateTime, Local};
use ratatui::prelude::Color;

/// Truncate to `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

pub fn role_color(role: &str) -> Color {
  match role {
    "admin" => Color::Magenta,
    "teacher" => Color::Green,
    "student" => Color::Cyan,
    _ => Color::White,
  }
}

/// Colour for a log level as the backend spells it
pub fn level_color(level: &str) -> Color {
  match level.to_lowercase().as_str() {
    "error" => Color::Red,
    "warning" | "warn" => Color::Yellow,
    "info" => Color::Green,
    _ => Color::DarkGray,
  }
}

/// RFC 3339 timestamp as local "YYYY-MM-DD HH:MM"; other strings pass through
pub fn format_timestamp(value: &str) -> String {
  match DateTime::parse_from_rfc3339(value) {
    Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    Err(_) => value.to_string(),
  }
}

/// Score with no trailing ".0" for whole numbers
pub fn format_score(score: f64) -> String {
  if score.fract() == 0.0 {
    format!("{:.0}", score)
  } else {
    format!("{:.2}", score)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Économie générale", 8), "Écono...");
  }

  #[test]
  fn test_level_color() {
    assert_eq!(level_color("ERROR"), Color::Red);
    assert_eq!(level_color("warning"), Color::Yellow);
    assert_eq!(level_color("debug"), Color::DarkGray);
  }

  #[test]
  fn test_format_timestamp_passthrough() {
    assert_eq!(format_timestamp(""), "");
    assert_eq!(format_timestamp("soon"), "soon");
    assert_eq!(format_timestamp("2026-05-31T18:30:00Z").len(), 16);
  }

  #[test]
  fn test_format_score() {
    assert_eq!(format_score(87.0), "87");
    assert_eq!(format_score(87.5), "87.50");
  }
}
