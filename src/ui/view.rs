use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
  /// No action needed
  None,
  /// Go to a route path; the app applies guards and fallbacks
  Navigate(String),
  /// Pop current view from stack (go back)
  Back,
  /// End the session and return to the login screen
  Logout,
  Quit,
}

/// Trait for view behavior
///
/// Views handle their own input modes (forms, prompts, filters) and return
/// actions for the App to execute: App → View → Components.
///
/// Views that load data asynchronously use a store or a `Query<T>` and poll
/// it in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to poll async queries. A finished submission may
  /// ask to navigate.
  fn tick(&mut self) -> ViewAction {
    ViewAction::None
  }

  /// Called when the view is on top of the stack again after the one above
  /// it was popped. Store-backed views reload their key here, since stores
  /// hold one state shared by every view.
  fn resume(&mut self) {}

  /// Get keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "back").with_priority(90)]
  }
}
