use crate::api::types::{Log, LogLevel};
use crate::api::LogQuery;
use crate::error::ApiError;
use crate::ui::components::{KeyResult, Listing, ListingEvent, ListingTable, Prompt, PromptEvent};
use crate::ui::renderfns::{format_timestamp, level_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{render_flash, store_status, with_status_line, Flash};
use crate::ui::Context;
use crate::validation::{parse_date_range, ValidationError};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Wrap};

/// Which filter the prompt is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterKind {
  Level,
  Source,
  Search,
  DateRange,
}

/// Turn prompt input into a log query. Empty input clears the filter.
fn build_query(kind: FilterKind, value: &str) -> Result<LogQuery, ValidationError> {
  let value = value.trim();
  if value.is_empty() {
    return Ok(LogQuery::All);
  }
  Ok(match kind {
    FilterKind::Level => LogQuery::Level(
      value
        .parse::<LogLevel>()
        .map_err(|_| ValidationError::new("level", "Level must be debug, info, warning or error"))?,
    ),
    FilterKind::Source => LogQuery::Source(value.to_string()),
    FilterKind::Search => LogQuery::Search(value.to_string()),
    FilterKind::DateRange => {
      let (start, end) = parse_date_range(value)?;
      LogQuery::DateRange { start, end }
    }
  })
}

fn describe(query: &LogQuery) -> String {
  match query {
    LogQuery::All => "Logs".to_string(),
    LogQuery::Level(level) => format!("Logs at level {}", level.as_str()),
    LogQuery::Source(source) => format!("Logs from '{}'", source),
    LogQuery::Search(text) => format!("Logs containing '{}'", text),
    LogQuery::DateRange { start, end } => format!("Logs {} to {}", start, end),
  }
}

/// Backend log lines, filtered by one criterion at a time.
pub struct LogsView {
  ctx: Context,
  query: LogQuery,
  listing: Listing,
  prompt: Prompt,
  editing: Option<FilterKind>,
  flash: Option<Flash>,
}

impl LogsView {
  pub fn new(ctx: Context) -> Self {
    ctx.stores.logs.spawn_fetch(LogQuery::All);
    Self {
      listing: Listing::new(ctx.page_size),
      ctx,
      query: LogQuery::All,
      prompt: Prompt::new(),
      editing: None,
      flash: None,
    }
  }

  fn apply(&mut self, query: LogQuery) {
    self.query = query;
    self.listing.reset();
    self.ctx.stores.logs.spawn_fetch(self.query.clone());
  }

  fn open_filter(&mut self, kind: FilterKind) {
    let (title, current) = match (kind, &self.query) {
      (FilterKind::Level, LogQuery::Level(level)) => ("Level", level.as_str().to_string()),
      (FilterKind::Level, _) => ("Level (debug, info, warning, error)", String::new()),
      (FilterKind::Source, LogQuery::Source(source)) => ("Source", source.clone()),
      (FilterKind::Source, _) => ("Source", String::new()),
      (FilterKind::Search, LogQuery::Search(text)) => ("Search messages", text.clone()),
      (FilterKind::Search, _) => ("Search messages", String::new()),
      (FilterKind::DateRange, LogQuery::DateRange { start, end }) => {
        ("Dates (YYYY-MM-DD..YYYY-MM-DD)", format!("{}..{}", start, end))
      }
      (FilterKind::DateRange, _) => ("Dates (YYYY-MM-DD..YYYY-MM-DD)", String::new()),
    };
    self.editing = Some(kind);
    self.prompt.open(title, &current);
  }

  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.prompt.handle_key(key) {
      KeyResult::Event(PromptEvent::Submitted(value)) => {
        if let Some(kind) = self.editing.take() {
          match build_query(kind, &value) {
            Ok(query) => {
              self.flash = None;
              self.apply(query);
            }
            Err(e) => self.flash = Some(ApiError::from(e).into()),
          }
        }
        Some(ViewAction::None)
      }
      KeyResult::Event(PromptEvent::Cancelled) => {
        self.editing = None;
        Some(ViewAction::None)
      }
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let len = self.ctx.stores.logs.items().len();
    match self.listing.handle_key(key, len) {
      KeyResult::Event(ListingEvent::Activate(_)) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let kind = match key.code {
      KeyCode::Char('v') => FilterKind::Level,
      KeyCode::Char('s') => FilterKind::Source,
      KeyCode::Char('/') => FilterKind::Search,
      KeyCode::Char('d') => FilterKind::DateRange,
      KeyCode::Char('c') => {
        self.flash = None;
        self.apply(LogQuery::All);
        return Some(ViewAction::None);
      }
      KeyCode::Char('r') => {
        self.ctx.stores.logs.invalidate(&self.query);
        self.ctx.stores.logs.spawn_fetch(self.query.clone());
        return Some(ViewAction::None);
      }
      KeyCode::Char('q') | KeyCode::Esc => return Some(ViewAction::Back),
      _ => return None,
    };
    self.open_filter(kind);
    Some(ViewAction::None)
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect, log: Option<&Log>) {
    let block = Block::default()
      .title(" Message ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    let text = match log {
      Some(log) => vec![
        Line::from(vec![
          Span::styled(log.level.to_uppercase(), Style::default().fg(level_color(&log.level))),
          Span::raw("  "),
          Span::styled(log.source.clone(), Style::default().fg(Color::Yellow)),
          Span::raw("  "),
          Span::styled(log.created_at.clone(), Style::default().fg(Color::DarkGray)),
        ]),
        Line::raw(log.message.clone()),
      ],
      None => vec![Line::styled("No log selected", Style::default().fg(Color::DarkGray))],
    };
    frame.render_widget(
      Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
      area,
    );
  }
}

impl View for LogsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn resume(&mut self) {
    self.ctx.stores.logs.spawn_fetch(self.query.clone());
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (main, status) = with_status_line(area);
    let [table_area, detail_area] =
      Layout::vertical([Constraint::Min(5), Constraint::Length(6)]).areas(main);

    let state = self.ctx.stores.logs.state();
    let logs = self.ctx.stores.logs.items();
    let rows: Vec<Row> = logs
      .iter()
      .map(|log| {
        Row::new(vec![
          Cell::from(format_timestamp(&log.created_at)),
          Cell::from(log.level.to_uppercase()).style(Style::default().fg(level_color(&log.level))),
          Cell::from(truncate(&log.source, 16)).style(Style::default().fg(Color::Yellow)),
          Cell::from(truncate(&log.message, 80)),
        ])
      })
      .collect();

    let title = describe(&self.query);
    self.listing.render(
      frame,
      table_area,
      ListingTable {
        title: &title,
        status: store_status(&state),
        header: vec!["Time", "Level", "Source", "Message"],
        widths: &[
          Constraint::Length(17),
          Constraint::Length(8),
          Constraint::Length(16),
          Constraint::Min(20),
        ],
        rows,
        empty_text: "No log entries match.",
      },
    );

    let selected = self.listing.selected(logs.len()).and_then(|idx| logs.get(idx));
    self.render_detail(frame, detail_area, selected);
    render_flash(
      frame,
      status,
      self.flash.as_ref(),
      "v level  s source  / search  d dates  c clear  r reload",
    );

    self.prompt.render_overlay(frame, main);
  }

  fn breadcrumb_label(&self) -> String {
    "Logs".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("v", "level").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("d", "dates").with_priority(30),
      ShortcutInfo::new("c", "clear").with_priority(40),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_clears_filter() {
    assert_eq!(build_query(FilterKind::Source, "  "), Ok(LogQuery::All));
  }

  #[test]
  fn test_level_filter_accepts_aliases() {
    assert_eq!(
      build_query(FilterKind::Level, "WARN"),
      Ok(LogQuery::Level(LogLevel::Warning))
    );
    assert_eq!(build_query(FilterKind::Level, "loud").unwrap_err().field, "level");
  }

  #[test]
  fn test_date_range_filter() {
    assert_eq!(
      build_query(FilterKind::DateRange, "2026-01-01..2026-01-31"),
      Ok(LogQuery::DateRange {
        start: "2026-01-01".to_string(),
        end: "2026-01-31".to_string(),
      })
    );
    assert!(build_query(FilterKind::DateRange, "2026-02-01..2026-01-01").is_err());
  }
}
