use crate::cache::RefreshSignal;
use crate::ui::notification::Notification;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
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
#[derive(Debug)]
pub enum ViewAction {
  /// No action needed
  None,
  /// Show a notification in the footer
  Notify(Notification),
}

/// Trait for list views (one per tab)
///
/// Views own their cache and handle their own prompts, returning actions for
/// the App to execute. Views that load data asynchronously poll their cache
/// in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Tab label
  fn title(&self) -> &'static str;

  /// Whether the view is capturing text input (App must not steal keys)
  fn is_editing(&self) -> bool {
    false
  }

  /// Called when the view becomes visible
  fn activate(&mut self) {}

  /// Forward a host refresh signal to the view's cache
  fn refresh(&mut self, _signal: RefreshSignal) {}

  /// Whether the view's cache heard back from the server after it had been
  /// unreachable. Reading it clears it.
  fn reconnected(&mut self) -> bool {
    false
  }

  /// Called on each tick to apply settled requests.
  /// Returns notifications for mutations that settled.
  fn tick(&mut self) -> Vec<Notification> {
    Vec::new()
  }

  /// Get keyboard shortcuts to display in the header
  /// Override this to provide view-specific shortcuts
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("tab", "switch").with_priority(10),
      ShortcutInfo::new("r", "reload").with_priority(20),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
