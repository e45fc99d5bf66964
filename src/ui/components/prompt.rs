use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Single-line prompt overlay used for create/edit forms.
///
/// `T` identifies what the prompt is for, so the parent knows how to
/// interpret the submitted text.
#[derive(Debug, Clone)]
pub struct Prompt<T> {
  input: TextInput,
  active: Option<(T, String)>,
}

impl<T: Clone> Default for Prompt<T> {
  fn default() -> Self {
    Self {
      input: TextInput::new(),
      active: None,
    }
  }
}

impl<T: Clone> Prompt<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active.is_some()
  }

  /// Open the prompt with a title and initial text
  pub fn open(&mut self, purpose: T, title: impl Into<String>, initial: &str) {
    self.input.set_value(initial);
    self.active = Some((purpose, title.into()));
  }

  pub fn close(&mut self) {
    self.active = None;
    self.input.clear();
  }

  /// Handle a key event while open. Emits `(purpose, text)` on submit.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<(T, String)> {
    let Some((purpose, _)) = &self.active else {
      return KeyResult::NotHandled;
    };

    match self.input.handle_key(key) {
      InputResult::Submitted(text) => {
        let purpose = purpose.clone();
        self.close();
        KeyResult::Submitted((purpose, text))
      }
      InputResult::Cancelled => {
        self.close();
        KeyResult::Handled
      }
      // Swallow everything else while open
      InputResult::Consumed | InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the prompt overlay if open
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some((_, title)) = &self.active else {
      return;
    };

    let width = (area.width * 70 / 100).clamp(30, 80).min(area.width);
    let height = 3;
    if area.height < height {
      return;
    }

    // Bottom-left of the content area
    let x = area.x + 1;
    let y = area.y + area.height - height;
    let overlay_area = Rect::new(x, y, width.min(area.width.saturating_sub(1)), height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let (before, after) = self.input.split_at_cursor();
    let input_line = Line::from(vec![
      Span::styled("> ", Style::default().fg(Color::Yellow)),
      Span::raw(before),
      Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
      Span::raw(after),
    ]);
    frame.render_widget(Paragraph::new(input_line), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyModifiers};

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_closed_prompt_ignores_keys() {
    let mut prompt: Prompt<u8> = Prompt::new();
    assert_eq!(
      prompt.handle_key(key(KeyCode::Char('n'))),
      KeyResult::NotHandled
    );
  }

  #[test]
  fn test_submit_returns_purpose_and_text() {
    let mut prompt = Prompt::new();
    prompt.open("rename", "Rename", "Ada");
    prompt.handle_key(key(KeyCode::Char('!')));

    let result = prompt.handle_key(key(KeyCode::Enter));
    assert_eq!(result, KeyResult::Submitted(("rename", "Ada!".to_string())));
    assert!(!prompt.is_active());
  }

  #[test]
  fn test_escape_closes_without_event() {
    let mut prompt = Prompt::new();
    prompt.open(1u8, "New", "");
    assert_eq!(prompt.handle_key(key(KeyCode::Esc)), KeyResult::Handled);
    assert!(!prompt.is_active());
  }
}
