use super::pagination::{page_line, Pager};
use super::KeyResult;
use crate::ui::ensure_valid_table_selection;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};

/// Events emitted by a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingEvent {
  /// Enter on the row at this index of the full list
  Activate(usize),
}

/// Paginated table with a row cursor.
///
/// j/k move the cursor, h/l or the arrow keys change page. Rows are
/// addressed by their index in the full (unpaginated) list.
#[derive(Debug, Clone)]
pub struct Listing {
  pager: Pager,
  state: TableState,
}

/// How the block title describes the data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingStatus {
  Loading,
  Error(String),
  Ready,
}

/// What a listing draws
pub struct ListingTable<'a> {
  pub title: &'a str,
  pub status: ListingStatus,
  pub header: Vec<&'static str>,
  pub widths: &'a [Constraint],
  pub rows: Vec<Row<'static>>,
  pub empty_text: &'a str,
}

impl Listing {
  pub fn new(page_size: usize) -> Self {
    Self {
      pager: Pager::new(page_size),
      state: TableState::default(),
    }
  }

  /// Back to the first row of the first page, e.g. after a filter change
  pub fn reset(&mut self) {
    self.pager.reset();
    self.state.select(None);
  }

  /// Index in the full list of the selected row
  pub fn selected(&self, len: usize) -> Option<usize> {
    self
      .state
      .selected()
      .map(|row| self.pager.absolute(row))
      .filter(|idx| *idx < len)
  }

  pub fn handle_key(&mut self, key: KeyEvent, len: usize) -> KeyResult<ListingEvent> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.state.select_next();
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.state.select_previous();
        KeyResult::Handled
      }
      KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => {
        if self.pager.next(len) {
          self.state.select(Some(0));
        }
        KeyResult::Handled
      }
      KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => {
        if self.pager.prev() {
          self.state.select(Some(0));
        }
        KeyResult::Handled
      }
      KeyCode::Enter => match self.selected(len) {
        Some(idx) => KeyResult::Event(ListingEvent::Activate(idx)),
        None => KeyResult::Handled,
      },
      _ => KeyResult::NotHandled,
    }
  }

  /// Draw the full formatted list, one page at a time, with a page strip below.
  pub fn render(&mut self, frame: &mut Frame, area: Rect, table: ListingTable<'_>) {
    let ListingTable {
      title,
      status,
      header,
      widths,
      rows,
      empty_text,
    } = table;
    let len = rows.len();
    self.pager.clamp(len);

    let title = match status {
      ListingStatus::Loading => format!(" {} (loading...) ", title),
      ListingStatus::Error(e) => format!(" {} (error: {}) ", title, e),
      ListingStatus::Ready => format!(" {} ({}) ", title, len),
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let paragraph = Paragraph::new(empty_text)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let [table_area, pages_area] =
      Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

    let range = self.pager.range(len);
    let visible = range.len();
    let page_rows: Vec<Row> = rows.into_iter().skip(range.start).take(visible).collect();
    ensure_valid_table_selection(&mut self.state, visible);

    let table = Table::new(page_rows, widths.to_vec())
      .header(Row::new(header).style(Style::default().fg(Color::Yellow).bold()))
      .block(block)
      .row_highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(table, table_area, &mut self.state);
    frame.render_widget(Paragraph::new(page_line(&self.pager, len)), pages_area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_activate_reports_index_in_full_list() {
    let mut listing = Listing::new(10);
    listing.state.select(Some(0));
    listing.handle_key(key(KeyCode::Right), 25);
    listing.handle_key(key(KeyCode::Down), 25);
    assert_eq!(
      listing.handle_key(key(KeyCode::Enter), 25),
      KeyResult::Event(ListingEvent::Activate(11))
    );
  }

  #[test]
  fn test_enter_without_rows_is_swallowed() {
    let mut listing = Listing::new(10);
    assert_eq!(listing.handle_key(key(KeyCode::Enter), 0), KeyResult::Handled);
    assert_eq!(listing.selected(0), None);
  }

  #[test]
  fn test_other_keys_pass_through() {
    let mut listing = Listing::new(10);
    assert_eq!(listing.handle_key(key(KeyCode::Char('d')), 3), KeyResult::NotHandled);
  }
}
