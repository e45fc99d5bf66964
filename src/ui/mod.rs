pub mod components;
pub mod notification;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let tabs = app.tab_titles();
  let shortcuts = app.current_view().shortcuts();

  renderfns::draw_header(
    frame,
    chunks[0],
    app.host(),
    app.role(),
    &tabs,
    app.active_tab(),
    &shortcuts,
  );

  app.current_view_mut().render(frame, chunks[1]);

  components::draw_footer(
    frame,
    chunks[2],
    app.notification(),
    "j/k:nav  tab:switch  r:reload  q:quit  Ctrl-C:quit",
  );
}

/// Keep a list selection inside `0..len`
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    None => state.select(Some(0)),
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}
