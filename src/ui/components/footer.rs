use crate::ui::notification::{Level, Notification};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer: the current notification, or key hints when there is none
pub fn draw_footer(frame: &mut Frame, area: Rect, notification: Option<&Notification>, hints: &str) {
  let line = match notification {
    Some(n) => {
      let (marker, color) = match n.level {
        Level::Success => ("✓", Color::Green),
        Level::Info => ("•", Color::Cyan),
        Level::Failure => ("✗", Color::Red),
      };
      Line::from(vec![
        Span::styled(format!(" {} ", marker), Style::default().fg(color).bold()),
        Span::styled(n.message.clone(), Style::default().fg(color)),
      ])
    }
    None => Line::from(Span::styled(
      format!(" {}", hints),
      Style::default().fg(Color::DarkGray),
    )),
  };

  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
