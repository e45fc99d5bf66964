use crate::api::employees::EmployeeCache;
use crate::api::types::{Employee, EmployeePatch, EmployeeStatus};
use crate::cache::{is_placeholder, FetchState, RefreshSignal};
use crate::forms::{parse_employee_draft, parse_name};
use crate::permissions::{can, Capability, Role};
use crate::ui::components::{KeyResult, Prompt};
use crate::ui::ensure_valid_selection;
use crate::ui::notification::Notification;
use crate::ui::renderfns::{employee_status_color, money, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

#[derive(Debug, Clone, PartialEq, Eq)]
enum EmployeePrompt {
  New,
  Rename(String),
}

/// View for the employee directory
pub struct EmployeeListView {
  cache: EmployeeCache,
  role: Role,
  list_state: ListState,
  prompt: Prompt<EmployeePrompt>,
}

impl EmployeeListView {
  pub fn new(cache: EmployeeCache, role: Role) -> Self {
    Self {
      cache,
      role,
      list_state: ListState::default(),
      prompt: Prompt::new(),
    }
  }

  fn employees(&self) -> &[Employee] {
    self.cache.items()
  }

  /// Selected employee's id, unless it is still being created
  fn selected_id(&self) -> Result<String, ViewAction> {
    let employee = self
      .list_state
      .selected()
      .and_then(|idx| self.employees().get(idx))
      .ok_or(ViewAction::None)?;

    if is_placeholder(&employee.id) {
      return Err(ViewAction::Notify(Notification::info(
        "Still saving this employee, try again in a moment",
      )));
    }
    Ok(employee.id.clone())
  }

  fn require(&self, capability: Capability) -> Result<(), ViewAction> {
    if can(self.role, capability) {
      Ok(())
    } else {
      Err(ViewAction::Notify(Notification::denied(capability)))
    }
  }

  fn on_command(&mut self, code: KeyCode) -> Result<(), ViewAction> {
    match code {
      KeyCode::Char('n') => {
        self.require(Capability::ManageEmployees)?;
        self.prompt.open(
          EmployeePrompt::New,
          "New employee: name, email[, department[, salary]]",
          "",
        );
      }
      KeyCode::Char('e') => {
        self.require(Capability::ManageEmployees)?;
        let id = self.selected_id()?;
        let name = self
          .cache
          .get(&id)
          .map(|e| e.name.clone())
          .unwrap_or_default();
        self
          .prompt
          .open(EmployeePrompt::Rename(id), "Rename employee", &name);
      }
      KeyCode::Char('x') => {
        self.require(Capability::ManageEmployees)?;
        let id = self.selected_id()?;
        let status = match self.cache.get(&id).map(|e| e.status) {
          Some(EmployeeStatus::Active) => EmployeeStatus::Inactive,
          _ => EmployeeStatus::Active,
        };
        self.cache.update(
          &id,
          EmployeePatch {
            status: Some(status),
            ..EmployeePatch::default()
          },
        );
      }
      KeyCode::Char('d') => {
        self.require(Capability::ManageEmployees)?;
        let id = self.selected_id()?;
        self.cache.delete(&id);
      }
      _ => {}
    }
    Ok(())
  }

  fn submit(&mut self, purpose: EmployeePrompt, text: &str) -> ViewAction {
    let result = match purpose {
      EmployeePrompt::New => parse_employee_draft(text).map(|draft| {
        self.cache.create(draft);
        // Follow the new row to the bottom of the list
        self.list_state.select(Some(self.employees().len() - 1));
      }),
      EmployeePrompt::Rename(id) => parse_name(text).map(|name| {
        self.cache.update(
          &id,
          EmployeePatch {
            name: Some(name),
            ..EmployeePatch::default()
          },
        );
      }),
    };

    match result {
      Ok(()) => ViewAction::None,
      Err(message) => ViewAction::Notify(Notification::failure(message)),
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.employees().len();
    ensure_valid_selection(&mut self.list_state, len);

    let mut title = match self.cache.state() {
      FetchState::Loading => " Employees (loading...)".to_string(),
      FetchState::Error(e) if len > 0 => format!(" Employees ({}) (refresh failed: {})", len, e.source),
      _ => format!(" Employees ({})", len),
    };
    if self.cache.pending_count() > 0 {
      title.push_str(&format!(" saving {}…", self.cache.pending_count()));
    }
    title.push(' ');

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let content = match self.cache.state() {
        FetchState::Loading | FetchState::Idle => "Loading employees...".to_string(),
        FetchState::Error(e) => format!("{}. Press 'r' to retry.", e),
        FetchState::Ready => "No employees found.".to_string(),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .employees()
      .iter()
      .map(|employee| {
        let provisional = is_placeholder(&employee.id);
        let text = if provisional {
          Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
        } else {
          Style::default()
        };
        let code = if provisional {
          "saving…"
        } else {
          employee.employee_id.as_str()
        };

        let line = Line::from(vec![
          Span::styled(
            format!("{:<10}", truncate(code, 10)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(format!("{:<24}", truncate(&employee.name, 24)), text),
          Span::raw(" "),
          Span::styled(format!("{:<16}", truncate(&employee.department, 16)), text),
          Span::raw(" "),
          Span::styled(
            format!("{:<9}", employee.status),
            Style::default().fg(employee_status_color(employee.status)),
          ),
          Span::raw(" "),
          Span::styled(format!("{:>12}", money(employee.salary)), text),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for EmployeeListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Let the prompt handle keys first while it is open
    match self.prompt.handle_key(key) {
      KeyResult::Submitted((purpose, text)) => return self.submit(purpose, &text),
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => {
        self.cache.refetch();
      }
      code => {
        if let Err(action) = self.on_command(code) {
          return action;
        }
      }
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.prompt.render_overlay(frame, area);
  }

  fn title(&self) -> &'static str {
    "Employees"
  }

  fn is_editing(&self) -> bool {
    self.prompt.is_active()
  }

  fn activate(&mut self) {
    self.cache.fetch();
  }

  fn refresh(&mut self, signal: RefreshSignal) {
    self.cache.signal(signal);
  }

  fn reconnected(&mut self) -> bool {
    self.cache.take_reconnected()
  }

  fn tick(&mut self) -> Vec<Notification> {
    self
      .cache
      .poll()
      .iter()
      .map(|outcome| Notification::from_outcome("Employee", outcome))
      .collect()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new("tab", "switch").with_priority(10),
      ShortcutInfo::new("r", "reload").with_priority(20),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ];
    if can(self.role, Capability::ManageEmployees) {
      shortcuts.extend([
        ShortcutInfo::new("n", "new").with_priority(30),
        ShortcutInfo::new("e", "rename").with_priority(40),
        ShortcutInfo::new("x", "toggle active").with_priority(50),
        ShortcutInfo::new("d", "delete").with_priority(60),
      ]);
    }
    shortcuts
  }
}
