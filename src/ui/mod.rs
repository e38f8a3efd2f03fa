pub mod components;
pub mod context;
pub mod renderfns;
pub mod view;
pub mod views;

pub use context::Context;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::{ListState, TableState};
use renderfns::{draw_footer, draw_header};

/// Main draw function: header, current view, breadcrumb footer
pub fn draw(frame: &mut Frame, app: &mut App) {
  let [header_area, content_area, footer_area] = Layout::vertical([
    Constraint::Length(1), // Header
    Constraint::Min(1),    // Current view
    Constraint::Length(1), // Breadcrumb
  ])
  .areas(frame.area());

  let shortcuts = app
    .current_view()
    .map(|view| view.shortcuts())
    .unwrap_or_default();
  let user = app.context().user();
  draw_header(
    frame,
    header_area,
    app.context().base_url(),
    user.as_ref(),
    &shortcuts,
  );

  if let Some(view) = app.current_view_mut() {
    view.render(frame, content_area);
  }

  draw_footer(frame, footer_area, &app.breadcrumb(), app.message());
}

/// Keep a list selection inside `0..len`, selecting the first row when
/// there is data and nothing is selected.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  state.select(valid_selection(state.selected(), len));
}

/// [`ensure_valid_selection`] for tables
pub fn ensure_valid_table_selection(state: &mut TableState, len: usize) {
  state.select(valid_selection(state.selected(), len));
}

fn valid_selection(selected: Option<usize>, len: usize) -> Option<usize> {
  if len == 0 {
    return None;
  }
  Some(selected.unwrap_or(0).min(len - 1))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_selection_clamped_to_len() {
    let mut state = TableState::default();
    ensure_valid_table_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(7));
    ensure_valid_table_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_table_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }

  #[test]
  fn test_list_selection() {
    let mut state = ListState::default();
    state.select(Some(4));
    ensure_valid_selection(&mut state, 2);
    assert_eq!(state.selected(), Some(1));
  }
}
