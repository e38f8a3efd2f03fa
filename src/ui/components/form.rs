use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::error::ApiError;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Events a form reports to its view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
  Submit,
  Cancel,
}

#[derive(Debug, Clone)]
pub struct FormField {
  pub name: &'static str,
  pub label: &'static str,
  pub hint: Option<String>,
  pub input: TextInput,
}

impl FormField {
  pub fn new(name: &'static str, label: &'static str) -> Self {
    Self {
      name,
      label,
      hint: None,
      input: TextInput::new(),
    }
  }

  pub fn password(name: &'static str, label: &'static str) -> Self {
    Self {
      input: TextInput::masked(),
      ..Self::new(name, label)
    }
  }

  pub fn hint(mut self, hint: impl Into<String>) -> Self {
    self.hint = Some(hint.into());
    self
  }

  pub fn value(mut self, value: impl Into<String>) -> Self {
    self.input.set_value(value);
    self
  }
}

/// Vertical list of labelled inputs with one focused field.
///
/// Tab/Down and BackTab/Up move focus, Enter submits, Esc cancels. Errors
/// are shown under the fields; a validation error also marks its field.
#[derive(Debug, Clone)]
pub struct Form {
  title: String,
  fields: Vec<FormField>,
  focus: usize,
  error: Option<String>,
  error_field: Option<&'static str>,
  notice: Option<String>,
  submitting: bool,
  /// Set once the user changes any field
  edited: bool,
}

impl Form {
  pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
    Self {
      title: title.into(),
      fields,
      focus: 0,
      error: None,
      error_field: None,
      notice: None,
      submitting: false,
      edited: false,
    }
  }

  /// Current value of a field, empty for unknown names
  pub fn value(&self, name: &str) -> &str {
    self
      .fields
      .iter()
      .find(|f| f.name == name)
      .map(|f| f.input.value())
      .unwrap_or("")
  }

  pub fn set_value(&mut self, name: &str, value: impl Into<String>) {
    if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
      field.input.set_value(value);
    }
  }

  pub fn focused(&self) -> Option<&'static str> {
    self.fields.get(self.focus).map(|f| f.name)
  }

  /// Show an error. Validation errors focus the offending field.
  pub fn set_error(&mut self, error: &ApiError) {
    self.error = Some(error.to_string());
    self.error_field = None;
    if let ApiError::Validation(validation) = error {
      if let Some(idx) = self.fields.iter().position(|f| f.name == validation.field) {
        self.focus = idx;
        self.error_field = Some(validation.field);
      }
    }
  }

  /// Show a plain error message not tied to a field
  pub fn set_error_message(&mut self, message: impl Into<String>) {
    self.error = Some(message.into());
    self.error_field = None;
  }

  pub fn set_notice(&mut self, notice: impl Into<String>) {
    self.notice = Some(notice.into());
  }

  pub fn clear_messages(&mut self) {
    self.error = None;
    self.error_field = None;
    self.notice = None;
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn set_submitting(&mut self, submitting: bool) {
    self.submitting = submitting;
  }

  pub fn is_submitting(&self) -> bool {
    self.submitting
  }

  /// Whether the user has typed into any field
  pub fn is_edited(&self) -> bool {
    self.edited
  }

  fn focus_next(&mut self) {
    if !self.fields.is_empty() {
      self.focus = (self.focus + 1) % self.fields.len();
    }
  }

  fn focus_prev(&mut self) {
    if !self.fields.is_empty() {
      self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    // Ignore edits while a submission is in flight
    if self.submitting {
      return match key.code {
        KeyCode::Esc => KeyResult::Event(FormEvent::Cancel),
        _ => KeyResult::Handled,
      };
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focus_next();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus_prev();
        return KeyResult::Handled;
      }
      _ => {}
    }

    let Some(field) = self.fields.get_mut(self.focus) else {
      return KeyResult::NotHandled;
    };
    let before = field.input.value().to_string();
    match field.input.handle_key(key) {
      InputResult::Submitted(_) => KeyResult::Event(FormEvent::Submit),
      InputResult::Cancelled => KeyResult::Event(FormEvent::Cancel),
      InputResult::Consumed => {
        if field.input.value() != before {
          self.edited = true;
        }
        KeyResult::Handled
      }
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let title = if self.submitting {
      format!(" {} (saving...) ", self.title)
    } else {
      format!(" {} ", self.title)
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let label_width = self
      .fields
      .iter()
      .map(|f| f.label.chars().count())
      .max()
      .unwrap_or(0);

    let mut lines = Vec::new();
    for (i, field) in self.fields.iter().enumerate() {
      let focused = i == self.focus;
      let invalid = self.error_field == Some(field.name);
      let label_style = if invalid {
        Style::default().fg(Color::Red).bold()
      } else if focused {
        Style::default().fg(Color::Cyan).bold()
      } else {
        Style::default().fg(Color::White)
      };

      let mut spans = vec![
        Span::styled(if focused { "> " } else { "  " }, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{:<width$} ", field.label, width = label_width), label_style),
      ];
      spans.push(Span::raw(field.input.display()));
      if focused {
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
      }
      lines.push(Line::from(spans));

      if let Some(hint) = &field.hint {
        lines.push(Line::from(Span::styled(
          format!("  {:<width$}  {}", "", hint, width = label_width),
          Style::default().fg(Color::DarkGray),
        )));
      }
    }

    lines.push(Line::raw(""));
    if let Some(error) = &self.error {
      lines.push(Line::from(Span::styled(
        format!("  {}", error),
        Style::default().fg(Color::Red),
      )));
    }
    if let Some(notice) = &self.notice {
      lines.push(Line::from(Span::styled(
        format!("  {}", notice),
        Style::default().fg(Color::Green),
      )));
    }
    lines.push(Line::from(Span::styled(
      "  Tab: next field   Enter: submit   Esc: cancel",
      Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }
}
