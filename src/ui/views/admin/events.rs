use crate::api::types::Event;
use crate::api::EventQuery;
use crate::error::ApiError;
use crate::ui::components::{KeyResult, Listing, ListingEvent, ListingTable, Prompt, PromptEvent};
use crate::ui::renderfns::{format_timestamp, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{render_flash, store_status, with_status_line, Flash};
use crate::ui::Context;
use crate::validation::{parse_date_range, ValidationError};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Wrap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterKind {
  Type,
  EntityType,
  EntityId,
  UserId,
  DateRange,
}

impl FilterKind {
  fn title(&self) -> &'static str {
    match self {
      FilterKind::Type => "Event type (e.g. COURSE_CREATED)",
      FilterKind::EntityType => "Entity type (course, user, grade, ...)",
      FilterKind::EntityId => "Entity ID",
      FilterKind::UserId => "User ID",
      FilterKind::DateRange => "Dates (YYYY-MM-DD..YYYY-MM-DD)",
    }
  }
}

fn parse_id(field: &'static str, value: &str) -> Result<u64, ValidationError> {
  value
    .parse::<u64>()
    .map_err(|_| ValidationError::new(field, "Enter a numeric ID"))
}

fn build_query(kind: FilterKind, value: &str) -> Result<EventQuery, ValidationError> {
  let value = value.trim();
  if value.is_empty() {
    return Ok(EventQuery::All);
  }
  Ok(match kind {
    FilterKind::Type => EventQuery::Type(value.to_string()),
    FilterKind::EntityType => EventQuery::EntityType(value.to_string()),
    FilterKind::EntityId => EventQuery::EntityId(parse_id("entity_id", value)?),
    FilterKind::UserId => EventQuery::UserId(parse_id("user_id", value)?),
    FilterKind::DateRange => {
      let (start, end) = parse_date_range(value)?;
      EventQuery::DateRange { start, end }
    }
  })
}

fn current_value(kind: FilterKind, query: &EventQuery) -> String {
  match (kind, query) {
    (FilterKind::Type, EventQuery::Type(v)) | (FilterKind::EntityType, EventQuery::EntityType(v)) => {
      v.clone()
    }
    (FilterKind::EntityId, EventQuery::EntityId(id)) | (FilterKind::UserId, EventQuery::UserId(id)) => {
      id.to_string()
    }
    (FilterKind::DateRange, EventQuery::DateRange { start, end }) => format!("{}..{}", start, end),
    _ => String::new(),
  }
}

fn describe(query: &EventQuery) -> String {
  match query {
    EventQuery::All => "Events".to_string(),
    EventQuery::Type(kind) => format!("Events of type {}", kind),
    EventQuery::EntityType(kind) => format!("Events on {} entities", kind),
    EventQuery::EntityId(id) => format!("Events on entity #{}", id),
    EventQuery::UserId(id) => format!("Events by user #{}", id),
    EventQuery::DateRange { start, end } => format!("Events {} to {}", start, end),
  }
}

/// Audit trail of domain events.
pub struct EventsView {
  ctx: Context,
  query: EventQuery,
  listing: Listing,
  prompt: Prompt,
  editing: Option<FilterKind>,
  flash: Option<Flash>,
}

impl EventsView {
  pub fn new(ctx: Context) -> Self {
    ctx.stores.events.spawn_fetch(EventQuery::All);
    Self {
      listing: Listing::new(ctx.page_size),
      ctx,
      query: EventQuery::All,
      prompt: Prompt::new(),
      editing: None,
      flash: None,
    }
  }

  fn apply(&mut self, query: EventQuery) {
    self.query = query;
    self.listing.reset();
    self.ctx.stores.events.spawn_fetch(self.query.clone());
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
    let len = self.ctx.stores.events.items().len();
    match self.listing.handle_key(key, len) {
      KeyResult::Event(ListingEvent::Activate(_)) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let kind = match key.code {
      KeyCode::Char('t') => FilterKind::Type,
      KeyCode::Char('e') => FilterKind::EntityType,
      KeyCode::Char('i') => FilterKind::EntityId,
      KeyCode::Char('u') => FilterKind::UserId,
      KeyCode::Char('d') => FilterKind::DateRange,
      KeyCode::Char('c') => {
        self.flash = None;
        self.apply(EventQuery::All);
        return Some(ViewAction::None);
      }
      KeyCode::Char('r') => {
        self.ctx.stores.events.invalidate(&self.query);
        self.ctx.stores.events.spawn_fetch(self.query.clone());
        return Some(ViewAction::None);
      }
      KeyCode::Char('q') | KeyCode::Esc => return Some(ViewAction::Back),
      _ => return None,
    };
    self.editing = Some(kind);
    self.prompt.open(kind.title(), &current_value(kind, &self.query));
    Some(ViewAction::None)
  }
}

fn detail_lines(event: Option<&Event>) -> Vec<Line<'static>> {
  let Some(event) = event else {
    return vec![Line::styled("No event selected", Style::default().fg(Color::DarkGray))];
  };
  let mut lines = vec![Line::from(vec![
    Span::styled(event.event_type.clone(), Style::default().fg(Color::Magenta).bold()),
    Span::raw(format!(
      "  {} #{}  by user #{}",
      event.entity_type, event.entity_id, event.user_id
    )),
  ])];
  if !event.details.is_null() {
    let details =
      serde_json::to_string_pretty(&event.details).unwrap_or_else(|_| event.details.to_string());
    lines.extend(details.lines().map(|l| Line::raw(l.to_string())));
  }
  lines
}

impl View for EventsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn resume(&mut self) {
    self.ctx.stores.events.spawn_fetch(self.query.clone());
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (main, status) = with_status_line(area);
    let [table_area, detail_area] =
      Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(main);

    let state = self.ctx.stores.events.state();
    let events = self.ctx.stores.events.items();
    let rows: Vec<Row> = events
      .iter()
      .map(|e| {
        Row::new(vec![
          Cell::from(format_timestamp(&e.created_at)),
          Cell::from(truncate(&e.event_type, 24)).style(Style::default().fg(Color::Magenta)),
          Cell::from(format!("{} #{}", e.entity_type, e.entity_id)),
          Cell::from(e.user_id.to_string()).style(Style::default().fg(Color::Cyan)),
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
        header: vec!["Time", "Type", "Entity", "User"],
        widths: &[
          Constraint::Length(17),
          Constraint::Min(16),
          Constraint::Min(12),
          Constraint::Length(6),
        ],
        rows,
        empty_text: "No events match.",
      },
    );

    let selected = self.listing.selected(events.len()).and_then(|idx| events.get(idx));
    let detail = Paragraph::new(detail_lines(selected))
      .block(
        Block::default()
          .title(" Details ")
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::DarkGray)),
      )
      .wrap(Wrap { trim: false });
    frame.render_widget(detail, detail_area);

    render_flash(
      frame,
      status,
      self.flash.as_ref(),
      "t type  e entity  i entity id  u user  d dates  c clear  r reload",
    );
    self.prompt.render_overlay(frame, main);
  }

  fn breadcrumb_label(&self) -> String {
    "Events".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("t", "type").with_priority(10),
      ShortcutInfo::new("e", "entity").with_priority(20),
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
  fn test_id_filters_must_be_numeric() {
    assert_eq!(build_query(FilterKind::EntityId, "42"), Ok(EventQuery::EntityId(42)));
    assert_eq!(build_query(FilterKind::UserId, "me").unwrap_err().field, "user_id");
  }

  #[test]
  fn test_prompt_prefills_only_matching_filter() {
    let query = EventQuery::UserId(7);
    assert_eq!(current_value(FilterKind::UserId, &query), "7");
    assert_eq!(current_value(FilterKind::EntityId, &query), "");
  }

  #[test]
  fn test_details_are_pretty_printed() {
    let event: Event = serde_json::from_str(
      r#"{"id":1,"type":"GRADE_UPDATED","entity_type":"grade","entity_id":3,"user_id":2,"details":{"score":90}}"#,
    )
    .unwrap();
    let lines = detail_lines(Some(&event));
    assert!(lines.len() > 2);
  }
}
