use crate::api::client::PayzenixClient;
use crate::api::employees::EmployeesApi;
use crate::api::loans::LoansApi;
use crate::cache::{CollectionCache, RefreshSignal};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::permissions::{can, Capability, Role};
use crate::ui;
use crate::ui::notification::Notification;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{EmployeeListView, LoanListView};
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info};

/// Top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Tab {
  Employees,
  Loans,
}

/// Main application state
pub struct App {
  /// One view per tab the role may see, in display order
  tabs: Vec<(Tab, Box<dyn View>)>,

  active_tab: usize,

  role: Role,

  /// API host, shown in the header
  host: String,

  /// Most recent notification, cleared once expired
  notification: Option<Notification>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, initial_tab: Option<Tab>) -> Result<Self> {
    let client = PayzenixClient::new(&config)?;
    let options = config.cache.options();
    let role = config.role;

    let mut tabs: Vec<(Tab, Box<dyn View>)> = Vec::new();
    if can(role, Capability::ViewEmployees) {
      let cache = CollectionCache::new(EmployeesApi::new(client.clone()), options);
      tabs.push((Tab::Employees, Box::new(EmployeeListView::new(cache, role))));
    }
    if can(role, Capability::ViewLoans) {
      let cache = CollectionCache::new(LoansApi::new(client.clone()), options);
      tabs.push((Tab::Loans, Box::new(LoanListView::new(cache, role))));
    }
    if tabs.is_empty() {
      return Err(eyre!("Role '{}' cannot view any lists", role));
    }

    let active_tab = match initial_tab {
      Some(tab) => tabs
        .iter()
        .position(|(t, _)| *t == tab)
        .ok_or_else(|| eyre!("Role '{}' cannot view the {:?} tab", role, tab))?,
      None => 0,
    };

    Ok(Self {
      tabs,
      active_tab,
      role,
      host: client.host(),
      notification: None,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableFocusChange)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));

    info!(role = %self.role, host = %self.host, "starting");
    self.current_view_mut().activate();

    let result = self.event_loop(&mut terminal, &mut events).await;

    // Cleanup terminal, even when the loop failed
    stdout().execute(DisableFocusChange)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::FocusGained => self.current_view_mut().refresh(RefreshSignal::Focus),
      Event::Tick => self.tick(),
    }
  }

  /// Apply settled requests in every tab, not just the visible one
  fn tick(&mut self) {
    let mut reconnected = false;
    for (_, view) in &mut self.tabs {
      for notification in view.tick() {
        info!(message = %notification.message, "mutation settled");
        self.notification = Some(notification);
      }
      reconnected |= view.reconnected();
    }

    // One tab reaching the server again is news for all of them
    if reconnected {
      info!("server reachable again, signalling reconnect");
      for (_, view) in &mut self.tabs {
        view.refresh(RefreshSignal::Reconnect);
      }
    }

    if self.notification.as_ref().is_some_and(|n| n.is_expired()) {
      self.notification = None;
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // An open prompt gets every key
    if !self.current_view().is_editing() {
      match key.code {
        KeyCode::Char('q') => {
          self.should_quit = true;
          return;
        }
        KeyCode::Tab => {
          self.switch_tab((self.active_tab + 1) % self.tabs.len());
          return;
        }
        KeyCode::BackTab => {
          self.switch_tab((self.active_tab + self.tabs.len() - 1) % self.tabs.len());
          return;
        }
        _ => {}
      }
    }

    match self.current_view_mut().handle_key(key) {
      ViewAction::None => {}
      ViewAction::Notify(notification) => self.notification = Some(notification),
    }
  }

  fn switch_tab(&mut self, idx: usize) {
    if idx == self.active_tab {
      return;
    }
    self.active_tab = idx;
    debug!(tab = ?self.tabs[idx].0, "switched tab");
    self.current_view_mut().activate();
  }

  // Accessors for UI rendering

  pub fn current_view(&self) -> &dyn View {
    self.tabs[self.active_tab].1.as_ref()
  }

  pub fn current_view_mut(&mut self) -> &mut dyn View {
    self.tabs[self.active_tab].1.as_mut()
  }

  pub fn tab_titles(&self) -> Vec<&'static str> {
    self.tabs.iter().map(|(_, view)| view.title()).collect()
  }

  pub fn active_tab(&self) -> usize {
    self.active_tab
  }

  pub fn role(&self) -> Role {
    self.role
  }

  pub fn host(&self) -> &str {
    &self.host
  }

  pub fn notification(&self) -> Option<&Notification> {
    self.notification.as_ref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  fn build(role: &str, tab: Option<Tab>) -> Result<App> {
    let yaml = format!("api:\n  url: http://127.0.0.1:9\nrole: {}\n", role);
    App::new(Config::parse(&yaml).unwrap(), tab)
  }

  fn press(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
  }

  #[test]
  fn test_tabs_follow_role() {
    assert_eq!(build("admin", None).unwrap().tab_titles(), ["Employees", "Loans"]);
    assert_eq!(build("employee", None).unwrap().tab_titles(), ["Loans"]);
  }

  #[test]
  fn test_initial_tab() {
    let app = build("hr", Some(Tab::Loans)).unwrap();
    assert_eq!(app.active_tab(), 1);
    assert_eq!(app.current_view().title(), "Loans");

    assert!(build("employee", Some(Tab::Employees)).is_err());
  }

  #[tokio::test]
  async fn test_tab_cycles_views() {
    let mut app = build("manager", None).unwrap();
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.current_view().title(), "Loans");
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.current_view().title(), "Employees");
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.current_view().title(), "Loans");
  }

  #[test]
  fn test_quit_keys() {
    let mut app = build("admin", None).unwrap();
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);

    let mut app = build("admin", None).unwrap();
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  #[test]
  fn test_q_is_typed_into_open_prompt() {
    let mut app = build("admin", None).unwrap();
    press(&mut app, KeyCode::Char('n'));
    assert!(app.current_view().is_editing());

    press(&mut app, KeyCode::Char('q'));
    assert!(!app.should_quit);
  }

  #[derive(Default)]
  struct RecordingView {
    back_online: bool,
    signals: Arc<Mutex<Vec<RefreshSignal>>>,
  }

  impl View for RecordingView {
    fn handle_key(&mut self, _key: KeyEvent) -> ViewAction {
      ViewAction::None
    }

    fn render(&mut self, _frame: &mut Frame, _area: Rect) {}

    fn title(&self) -> &'static str {
      "Recording"
    }

    fn refresh(&mut self, signal: RefreshSignal) {
      self.signals.lock().unwrap().push(signal);
    }

    fn reconnected(&mut self) -> bool {
      std::mem::take(&mut self.back_online)
    }
  }

  #[test]
  fn test_reconnect_in_one_tab_signals_every_tab() {
    let first = RecordingView {
      back_online: true,
      ..RecordingView::default()
    };
    let second = RecordingView::default();
    let (first_signals, second_signals) = (first.signals.clone(), second.signals.clone());

    let tabs: Vec<(Tab, Box<dyn View>)> = vec![
      (Tab::Employees, Box::new(first) as Box<dyn View>),
      (Tab::Loans, Box::new(second) as Box<dyn View>),
    ];
    let mut app = App {
      tabs,
      active_tab: 0,
      role: Role::Admin,
      host: "localhost".to_string(),
      notification: None,
      should_quit: false,
    };

    app.tick();
    assert_eq!(*first_signals.lock().unwrap(), [RefreshSignal::Reconnect]);
    assert_eq!(*second_signals.lock().unwrap(), [RefreshSignal::Reconnect]);

    app.tick();
    assert_eq!(second_signals.lock().unwrap().len(), 1);
  }

  #[test]
  fn test_denied_action_becomes_notification() {
    let mut app = build("manager", None).unwrap();
    press(&mut app, KeyCode::Char('d'));

    let notification = app.notification().unwrap();
    assert_eq!(notification.message, "Not permitted: manage employees");
  }
}
