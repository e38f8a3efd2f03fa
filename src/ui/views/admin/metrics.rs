use crate::api::types::Metric;
use crate::query::Query;
use crate::ui::components::{KeyResult, Listing, ListingTable, Prompt, PromptEvent};
use crate::ui::renderfns::{format_timestamp, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::query_status;
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};

fn format_labels(metric: &Metric) -> String {
  metric
    .labels
    .iter()
    .map(|(k, v)| format!("{}={}", k, v))
    .collect::<Vec<_>>()
    .join(",")
}

pub struct MetricsView {
  metrics: Query<Vec<Metric>>,
  listing: Listing,
  filter: Prompt,
  filter_text: String,
}

impl MetricsView {
  pub fn new(ctx: Context) -> Self {
    let api = ctx.api.clone();
    Self {
      metrics: Query::started(move || {
        let api = api.clone();
        async move { api.monitoring.metrics().await }
      }),
      listing: Listing::new(ctx.page_size),
      filter: Prompt::new(),
      filter_text: String::new(),
    }
  }

  fn visible(&self) -> Vec<&Metric> {
    let needle = self.filter_text.to_lowercase();
    self
      .metrics
      .data()
      .map(|metrics| {
        metrics
          .iter()
          .filter(|m| needle.is_empty() || m.name.to_lowercase().contains(&needle))
          .collect()
      })
      .unwrap_or_default()
  }
}

impl View for MetricsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.filter.handle_key(key) {
      KeyResult::Event(PromptEvent::Submitted(text)) => {
        self.filter_text = text;
        self.listing.reset();
        return ViewAction::None;
      }
      KeyResult::Event(PromptEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    let len = self.visible().len();
    if !matches!(self.listing.handle_key(key, len), KeyResult::NotHandled) {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('/') => {
        self.filter.open("Filter by metric name", &self.filter_text);
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.metrics.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Back,
      _ => ViewAction::None,
    }
  }

  fn tick(&mut self) -> ViewAction {
    self.metrics.poll();
    ViewAction::None
  }

  fn resume(&mut self) {
    self.metrics.refetch();
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = self
      .visible()
      .into_iter()
      .map(|m| {
        Row::new(vec![
          Cell::from(m.name.clone()).style(Style::default().fg(Color::Cyan)),
          Cell::from(format!("{}", m.value)).style(Style::default().bold()),
          Cell::from(truncate(&format_labels(m), 40)).style(Style::default().fg(Color::DarkGray)),
          Cell::from(format_timestamp(&m.timestamp)),
        ])
      })
      .collect();

    let title = if self.filter_text.is_empty() {
      "Metrics".to_string()
    } else {
      format!("Metrics matching '{}'", self.filter_text)
    };
    self.listing.render(
      frame,
      area,
      ListingTable {
        title: &title,
        status: query_status(&self.metrics),
        header: vec!["Name", "Value", "Labels", "Timestamp"],
        widths: &[
          Constraint::Min(24),
          Constraint::Length(14),
          Constraint::Min(20),
          Constraint::Length(17),
        ],
        rows,
        empty_text: "No metrics reported.",
      },
    );
    self.filter.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Metrics".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("/", "filter").with_priority(10),
      ShortcutInfo::new("r", "reload").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_labels_are_sorted_pairs() {
    let metric: Metric = serde_json::from_str(
      r#"{"name":"http_requests","value":12,"labels":{"status":"200","method":"GET"}}"#,
    )
    .unwrap();
    assert_eq!(format_labels(&metric), "method=GET,status=200");
  }
}
