use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by a prompt that the parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
  /// Enter pressed; the prompt closed with this value
  Submitted(String),
  Cancelled,
}

/// One-line input overlay used for filters and quick entries
/// (a student ID, a search term, a date range).
#[derive(Debug, Clone, Default)]
pub struct Prompt {
  input: TextInput,
  title: String,
  active: bool,
}

impl Prompt {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open with a title and a prefilled value
  pub fn open(&mut self, title: impl Into<String>, value: &str) {
    self.title = title.into();
    self.input.set_value(value);
    self.active = true;
  }

  /// Handle a key while open. Closed prompts never consume keys.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PromptEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(value) => {
        self.active = false;
        KeyResult::Event(PromptEvent::Submitted(value.trim().to_string()))
      }
      InputResult::Cancelled => {
        self.active = false;
        KeyResult::Event(PromptEvent::Cancelled)
      }
      InputResult::Consumed | InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the overlay if open
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width / 10 * 6).clamp(30, 70);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, 3).intersection(area);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);
    if inner.height == 0 {
      return;
    }

    let input_line = Line::from(vec![
      Span::styled("> ", Style::default().fg(Color::Yellow)),
      Span::raw(self.input.display()),
      Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
    ]);
    frame.render_widget(Paragraph::new(input_line), inner);
  }
}

/// Yes/no question shown before destructive actions
#[derive(Debug, Clone, Default)]
pub struct Confirm {
  question: Option<String>,
}

impl Confirm {
  pub fn is_active(&self) -> bool {
    self.question.is_some()
  }

  pub fn ask(&mut self, question: impl Into<String>) {
    self.question = Some(question.into());
  }

  /// `Event(true)` on y, `Event(false)` on n/Esc, everything else swallowed.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<bool> {
    if self.question.is_none() {
      return KeyResult::NotHandled;
    }
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => {
        self.question = None;
        KeyResult::Event(true)
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
        self.question = None;
        KeyResult::Event(false)
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some(question) = &self.question else {
      return;
    };

    let width = u16::try_from(question.chars().count() + 6)
      .unwrap_or(u16::MAX)
      .clamp(30, 80);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(4) / 2;
    let overlay_area = Rect::new(x, y, width, 4).intersection(area);

    frame.render_widget(Clear, overlay_area);
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(" Confirm ");
    let text = vec![
      Line::raw(question.clone()),
      Line::from(vec![
        Span::styled("y", Style::default().fg(Color::Cyan)),
        Span::styled(" yes   ", Style::default().fg(Color::DarkGray)),
        Span::styled("n", Style::default().fg(Color::Cyan)),
        Span::styled(" no", Style::default().fg(Color::DarkGray)),
      ]),
    ];
    frame.render_widget(
      Paragraph::new(text).block(block).alignment(Alignment::Center),
      overlay_area,
    );
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
  fn test_closed_prompt_ignores_keys() {
    let mut prompt = Prompt::new();
    assert_eq!(prompt.handle_key(key(KeyCode::Char('x'))), KeyResult::NotHandled);
  }

  #[test]
  fn test_prompt_submits_trimmed_value() {
    let mut prompt = Prompt::new();
    prompt.open("Student ID", "");
    prompt.handle_key(key(KeyCode::Char('4')));
    prompt.handle_key(key(KeyCode::Char(' ')));
    assert_eq!(
      prompt.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(PromptEvent::Submitted("4".to_string()))
    );
    assert!(!prompt.is_active());
  }

  #[test]
  fn test_prompt_prefill_and_cancel() {
    let mut prompt = Prompt::new();
    prompt.open("Level", "error");
    prompt.handle_key(key(KeyCode::Backspace));
    assert_eq!(
      prompt.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(PromptEvent::Cancelled)
    );
  }

  #[test]
  fn test_confirm() {
    let mut confirm = Confirm::default();
    assert_eq!(confirm.handle_key(key(KeyCode::Char('y'))), KeyResult::NotHandled);

    confirm.ask("Delete course?");
    assert_eq!(confirm.handle_key(key(KeyCode::Char('x'))), KeyResult::Handled);
    assert_eq!(confirm.handle_key(key(KeyCode::Char('y'))), KeyResult::Event(true));
    assert!(!confirm.is_active());

    confirm.ask("Delete course?");
    assert_eq!(confirm.handle_key(key(KeyCode::Esc)), KeyResult::Event(false));
  }
}
