use crate::api::types::{EmployeeStatus, LoanStatus};
use ratatui::prelude::Color;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Format a money amount with thousands separators and two decimals
pub fn money(amount: f64) -> String {
  let cents = (amount.abs() * 100.0).round() as u64;
  let whole = (cents / 100).to_string();
  let mut grouped = String::new();
  for (i, c) in whole.chars().enumerate() {
    if i > 0 && (whole.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(c);
  }
  let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
  format!("{}{}.{:02}", sign, grouped, cents % 100)
}

pub fn employee_status_color(status: EmployeeStatus) -> Color {
  match status {
    EmployeeStatus::Active => Color::Green,
    EmployeeStatus::OnLeave => Color::Yellow,
    EmployeeStatus::Inactive => Color::DarkGray,
  }
}

pub fn loan_status_color(status: LoanStatus) -> Color {
  match status {
    LoanStatus::Pending => Color::Yellow,
    LoanStatus::Approved => Color::Green,
    LoanStatus::Rejected => Color::Red,
    LoanStatus::Paid => Color::Blue,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Zoë Åberg-Lindqvist", 8), "Zoë Å...");
  }

  #[test]
  fn test_money() {
    assert_eq!(money(0.0), "0.00");
    assert_eq!(money(999.5), "999.50");
    assert_eq!(money(1234567.891), "1,234,567.89");
    assert_eq!(money(-1500.0), "-1,500.00");
  }

  #[test]
  fn test_loan_status_color() {
    assert_eq!(loan_status_color(LoanStatus::Approved), Color::Green);
    assert_eq!(loan_status_color(LoanStatus::Rejected), Color::Red);
  }
}
