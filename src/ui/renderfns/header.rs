use crate::permissions::Role;
use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, context, tabs and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  host: &str,
  role: Role,
  tabs: &[&str],
  active_tab: usize,
  shortcuts: &[ShortcutInfo],
) {
  let mut spans = vec![
    Span::styled(" payzenix ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", host), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", role), Style::default().fg(Color::Magenta)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
  ];

  for (i, tab) in tabs.iter().enumerate() {
    let style = if i == active_tab {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::DarkGray)
    };
    spans.push(Span::styled(format!(" {} ", tab), style));
  }

  spans.push(Span::raw("  "));

  // Shortcuts - keys highlighted, descriptions dimmed
  let mut shortcuts: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  shortcuts.sort_by_key(|s| s.priority);
  for shortcut in shortcuts {
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}  ", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}
