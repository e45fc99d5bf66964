//! Parsing of the single-line prompts used to create and edit records.

use crate::api::types::{EmployeeDraft, LoanDraft};

/// Parse `name, email[, department[, salary]]` into an employee draft.
pub fn parse_employee_draft(input: &str) -> Result<EmployeeDraft, String> {
  let fields: Vec<&str> = input.split(',').map(str::trim).collect();

  let name = fields.first().copied().unwrap_or_default();
  if name.is_empty() {
    return Err("Name is required".to_string());
  }

  let email = fields.get(1).copied().unwrap_or_default();
  if !email.contains('@') {
    return Err("Expected: name, email[, department[, salary]]".to_string());
  }

  let department = fields
    .get(2)
    .filter(|d| !d.is_empty())
    .map(|d| d.to_string());

  let salary = match fields.get(3).filter(|s| !s.is_empty()) {
    Some(s) => Some(parse_amount(s)?),
    None => None,
  };

  if fields.len() > 4 {
    return Err("Too many fields".to_string());
  }

  Ok(EmployeeDraft {
    name: name.to_string(),
    email: email.to_string(),
    department,
    salary,
    ..EmployeeDraft::default()
  })
}

/// Parse `employee-id amount [reason...]` into a loan draft.
pub fn parse_loan_draft(input: &str) -> Result<LoanDraft, String> {
  let mut parts = input.split_whitespace();

  let employee = parts
    .next()
    .ok_or_else(|| "Expected: employee-id amount [reason]".to_string())?;
  let amount = parts
    .next()
    .ok_or_else(|| "Amount is required".to_string())
    .and_then(parse_amount)?;

  let reason = parts.collect::<Vec<_>>().join(" ");

  Ok(LoanDraft {
    employee: employee.to_string(),
    amount,
    reason: if reason.is_empty() { None } else { Some(reason) },
  })
}

/// Parse a strictly positive money amount, allowing `,` thousands separators.
pub fn parse_amount(input: &str) -> Result<f64, String> {
  let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
  match cleaned.parse::<f64>() {
    Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
    Ok(_) => Err(format!("Amount must be positive: {}", input.trim())),
    Err(_) => Err(format!("Not a number: {}", input.trim())),
  }
}

/// Parse a non-empty name
pub fn parse_name(input: &str) -> Result<String, String> {
  let name = input.trim();
  if name.is_empty() {
    Err("Name is required".to_string())
  } else {
    Ok(name.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_employee_draft_minimal() {
    let draft = parse_employee_draft("Ada Lovelace, ada@example.com").unwrap();
    assert_eq!(draft.name, "Ada Lovelace");
    assert_eq!(draft.email, "ada@example.com");
    assert_eq!(draft.department, None);
    assert_eq!(draft.salary, None);
  }

  #[test]
  fn test_employee_draft_full() {
    // The thousands separator collides with the field separator
    let err = parse_employee_draft("Ada, ada@example.com, Engineering, 85,000").unwrap_err();
    assert_eq!(err, "Too many fields");

    let draft = parse_employee_draft("Ada, ada@example.com, Engineering, 85000").unwrap();
    assert_eq!(draft.department.as_deref(), Some("Engineering"));
    assert_eq!(draft.salary, Some(85000.0));
  }

  #[test]
  fn test_employee_draft_requires_email() {
    assert!(parse_employee_draft("Ada").is_err());
    assert!(parse_employee_draft("Ada, not-an-email").is_err());
    assert!(parse_employee_draft(", ada@example.com").is_err());
  }

  #[test]
  fn test_loan_draft_with_reason() {
    let draft = parse_loan_draft("E1 1,500 new laptop").unwrap();
    assert_eq!(draft.employee, "E1");
    assert_eq!(draft.amount, 1500.0);
    assert_eq!(draft.reason.as_deref(), Some("new laptop"));
  }

  #[test]
  fn test_loan_draft_without_reason() {
    let draft = parse_loan_draft("E1 200").unwrap();
    assert_eq!(draft.reason, None);
  }

  #[test]
  fn test_loan_draft_errors() {
    assert!(parse_loan_draft("").is_err());
    assert!(parse_loan_draft("E1").is_err());
    assert!(parse_loan_draft("E1 lots").is_err());
    assert!(parse_loan_draft("E1 -5").is_err());
  }

  #[test]
  fn test_parse_amount() {
    assert_eq!(parse_amount(" 250.50 "), Ok(250.5));
    assert!(parse_amount("0").is_err());
    assert!(parse_amount("NaN").is_err());
  }
}
