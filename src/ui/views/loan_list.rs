use crate::api::loans::LoanCache;
use crate::api::types::{Loan, LoanPatch, LoanStatus};
use crate::cache::{is_placeholder, FetchState, MutationKind, RefreshSignal};
use crate::forms::{parse_amount, parse_loan_draft};
use crate::permissions::{can, Capability, Role};
use crate::ui::components::{KeyResult, Prompt};
use crate::ui::ensure_valid_selection;
use crate::ui::notification::Notification;
use crate::ui::renderfns::{loan_status_color, money, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoanPrompt {
  New,
  Repay(String),
}

/// View for loan requests and their approval workflow
pub struct LoanListView {
  cache: LoanCache,
  role: Role,
  list_state: ListState,
  prompt: Prompt<LoanPrompt>,
}

impl LoanListView {
  pub fn new(cache: LoanCache, role: Role) -> Self {
    Self {
      cache,
      role,
      list_state: ListState::default(),
      prompt: Prompt::new(),
    }
  }

  fn loans(&self) -> &[Loan] {
    self.cache.items()
  }

  /// Selected loan, unless it is still being created
  fn selected(&self) -> Result<&Loan, ViewAction> {
    let loan = self
      .list_state
      .selected()
      .and_then(|idx| self.loans().get(idx))
      .ok_or(ViewAction::None)?;

    if is_placeholder(&loan.id) {
      return Err(ViewAction::Notify(Notification::info(
        "Still saving this loan, try again in a moment",
      )));
    }
    Ok(loan)
  }

  fn require(&self, capability: Capability) -> Result<(), ViewAction> {
    if can(self.role, capability) {
      Ok(())
    } else {
      Err(ViewAction::Notify(Notification::denied(capability)))
    }
  }

  /// Approve or reject the selected loan; only pending loans are decided
  fn decide(&mut self, status: LoanStatus) -> Result<(), ViewAction> {
    self.require(Capability::ApproveLoans)?;
    let loan = self.selected()?;
    if loan.status != LoanStatus::Pending {
      return Err(ViewAction::Notify(Notification::info(format!(
        "Loan is already {}",
        loan.status.to_string().to_lowercase()
      ))));
    }

    let id = loan.id.clone();
    self.cache.change_status(&id, status);
    Ok(())
  }

  fn on_command(&mut self, code: KeyCode) -> Result<(), ViewAction> {
    match code {
      KeyCode::Char('n') => {
        self.require(Capability::RequestLoans)?;
        self.prompt.open(
          LoanPrompt::New,
          "New loan: employee-id amount [reason]",
          "",
        );
      }
      KeyCode::Char('p') => {
        self.require(Capability::RecordRepayments)?;
        let loan = self.selected()?;
        if loan.status != LoanStatus::Approved {
          return Err(ViewAction::Notify(Notification::info(
            "Repayments are recorded against approved loans",
          )));
        }
        let title = format!("Repayment (outstanding {})", money(loan.remaining()));
        let id = loan.id.clone();
        self.prompt.open(LoanPrompt::Repay(id), title, "");
      }
      KeyCode::Char('a') => self.decide(LoanStatus::Approved)?,
      KeyCode::Char('x') => self.decide(LoanStatus::Rejected)?,
      KeyCode::Char('d') => {
        self.require(Capability::DeleteLoans)?;
        let id = self.selected()?.id.clone();
        self.cache.delete(&id);
      }
      _ => {}
    }
    Ok(())
  }

  fn submit(&mut self, purpose: LoanPrompt, text: &str) -> ViewAction {
    let result = match purpose {
      LoanPrompt::New => parse_loan_draft(text).map(|draft| {
        self.cache.create(draft);
        self.list_state.select(Some(self.loans().len() - 1));
      }),
      LoanPrompt::Repay(id) => parse_amount(text).and_then(|payment| {
        // The loan may have vanished in a refresh while the prompt was open
        let patch = self
          .cache
          .get(&id)
          .map(|loan| LoanPatch::repayment(loan, payment))
          .ok_or_else(|| "Loan no longer exists".to_string())?;
        self.cache.update(&id, patch);
        Ok(())
      }),
    };

    match result {
      Ok(()) => ViewAction::None,
      Err(message) => ViewAction::Notify(Notification::failure(message)),
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.loans().len();
    ensure_valid_selection(&mut self.list_state, len);

    let mut title = match self.cache.state() {
      FetchState::Loading => " Loans (loading...)".to_string(),
      FetchState::Error(e) if len > 0 => format!(" Loans ({}) (refresh failed: {})", len, e.source),
      _ => format!(" Loans ({})", len),
    };
    if self.cache.is_pending(MutationKind::StatusChange) {
      title.push_str(" deciding…");
    } else if self.cache.pending_count() > 0 {
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
        FetchState::Loading | FetchState::Idle => "Loading loans...".to_string(),
        FetchState::Error(e) => format!("{}. Press 'r' to retry.", e),
        FetchState::Ready => "No loans found.".to_string(),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .loans()
      .iter()
      .map(|loan| {
        let text = if is_placeholder(&loan.id) {
          Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
        } else {
          Style::default()
        };

        let line = Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(loan.employee.label(), 24)),
            text,
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<9}", loan.status),
            Style::default().fg(loan_status_color(loan.status)),
          ),
          Span::raw(" "),
          Span::styled(format!("{:>12}", money(loan.amount)), text),
          Span::raw(" "),
          Span::styled(
            format!("{:>12}", money(loan.remaining())),
            Style::default().fg(Color::Yellow),
          ),
          Span::raw(" "),
          Span::styled(
            truncate(loan.reason.as_deref().unwrap_or(""), 40),
            Style::default().fg(Color::DarkGray),
          ),
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

impl View for LoanListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
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
    "Loans"
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
      .map(|outcome| Notification::from_outcome("Loan", outcome))
      .collect()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new("tab", "switch").with_priority(10),
      ShortcutInfo::new("r", "reload").with_priority(20),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ];
    if can(self.role, Capability::RequestLoans) {
      shortcuts.push(ShortcutInfo::new("n", "new").with_priority(30));
    }
    if can(self.role, Capability::ApproveLoans) {
      shortcuts.push(ShortcutInfo::new("a", "approve").with_priority(40));
      shortcuts.push(ShortcutInfo::new("x", "reject").with_priority(41));
    }
    if can(self.role, Capability::RecordRepayments) {
      shortcuts.push(ShortcutInfo::new("p", "repayment").with_priority(50));
    }
    if can(self.role, Capability::DeleteLoans) {
      shortcuts.push(ShortcutInfo::new("d", "delete").with_priority(60));
    }
    shortcuts
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::client::PayzenixClient;
  use crate::api::loans::LoansApi;
  use crate::cache::CollectionCache;
  use crate::config::Config;
  use crossterm::event::KeyModifiers;

  fn view(role: Role) -> LoanListView {
    let config = Config::parse("api:\n  url: http://localhost:5000\n").unwrap();
    let client = PayzenixClient::new(&config).unwrap();
    let cache = CollectionCache::new(LoansApi::new(client), config.cache.options());
    LoanListView::new(cache, role)
  }

  fn press(view: &mut LoanListView, c: char) -> ViewAction {
    view.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
  }

  fn denial(action: ViewAction) -> String {
    match action {
      ViewAction::Notify(n) => n.message,
      other => panic!("expected denial, got {:?}", other),
    }
  }

  #[test]
  fn test_employee_can_request_but_not_decide() {
    let mut view = view(Role::Employee);

    assert_eq!(denial(press(&mut view, 'a')), "Not permitted: approve loans");
    assert_eq!(denial(press(&mut view, 'x')), "Not permitted: approve loans");
    assert_eq!(denial(press(&mut view, 'd')), "Not permitted: delete loans");

    press(&mut view, 'n');
    assert!(view.is_editing());
  }

  #[test]
  fn test_manager_cannot_record_repayments() {
    let mut view = view(Role::Manager);
    assert_eq!(
      denial(press(&mut view, 'p')),
      "Not permitted: record repayments"
    );
  }

  #[test]
  fn test_invalid_loan_draft_is_reported() {
    let mut view = view(Role::Employee);
    press(&mut view, 'n');
    for c in "E1 lots".chars() {
      press(&mut view, c);
    }
    let action = view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

    assert_eq!(denial(action), "Not a number: lots");
    assert_eq!(view.cache.pending_count(), 0);
  }

  #[test]
  fn test_repayment_for_missing_loan_is_reported() {
    let mut view = view(Role::Admin);
    let action = view.submit(LoanPrompt::Repay("L9".to_string()), "100");

    assert_eq!(denial(action), "Loan no longer exists");
    assert_eq!(view.cache.pending_count(), 0);
  }

  #[test]
  fn test_shortcuts_follow_role() {
    let keys = |role| -> Vec<&'static str> { view(role).shortcuts().iter().map(|s| s.key).collect() };

    assert!(keys(Role::Employee).contains(&"n"));
    assert!(!keys(Role::Employee).contains(&"a"));
    assert!(keys(Role::Manager).contains(&"a"));
    assert!(!keys(Role::Hr).contains(&"d"));
    assert!(keys(Role::Admin).contains(&"d"));
  }
}
