//! Records exchanged with the PayZenix API.
//!
//! Field names follow the server's JSON (camelCase, Mongo `_id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Employees
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmployeeStatus {
  #[default]
  Active,
  Inactive,
  OnLeave,
}

impl fmt::Display for EmployeeStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // pad() so list columns can use width specifiers
    f.pad(match self {
      EmployeeStatus::Active => "Active",
      EmployeeStatus::Inactive => "Inactive",
      EmployeeStatus::OnLeave => "On leave",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  #[serde(rename = "_id")]
  pub id: String,
  #[serde(default)]
  pub employee_id: String,
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub department: String,
  #[serde(default)]
  pub position: String,
  #[serde(default)]
  pub salary: f64,
  #[serde(default)]
  pub status: EmployeeStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub join_date: Option<DateTime<Utc>>,
}

/// Body of `POST /api/employees`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDraft {
  pub name: String,
  pub email: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub employee_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub department: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub position: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub salary: Option<f64>,
}

/// Body of `PUT /api/employees/{id}`; only supplied fields change
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub department: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub position: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub salary: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<EmployeeStatus>,
}

// ============================================================================
// Loans
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
  Paid,
}

impl fmt::Display for LoanStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(match self {
      LoanStatus::Pending => "Pending",
      LoanStatus::Approved => "Approved",
      LoanStatus::Rejected => "Rejected",
      LoanStatus::Paid => "Paid",
    })
  }
}

/// The `employee` field of a loan: a bare id, or the populated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmployeeRef {
  Id(String),
  Populated {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "employeeId")]
    employee_id: String,
  },
}

impl EmployeeRef {
  pub fn id(&self) -> &str {
    match self {
      EmployeeRef::Id(id) => id,
      EmployeeRef::Populated { id, .. } => id,
    }
  }

  /// Name when populated, id otherwise
  pub fn label(&self) -> &str {
    match self {
      EmployeeRef::Populated { name, .. } if !name.is_empty() => name,
      _ => self.id(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
  #[serde(rename = "_id")]
  pub id: String,
  pub employee: EmployeeRef,
  pub amount: f64,
  #[serde(default)]
  pub status: LoanStatus,
  #[serde(default)]
  pub paid_amount: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

impl Loan {
  /// Outstanding balance, never negative
  pub fn remaining(&self) -> f64 {
    (self.amount - self.paid_amount).max(0.0)
  }
}

/// Body of `POST /api/loans`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDraft {
  pub employee: String,
  pub amount: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
}

/// Body of `PUT /api/loans/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub amount: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub paid_amount: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
}

impl LoanPatch {
  /// Patch recording a repayment of `payment` against `loan`.
  pub fn repayment(loan: &Loan, payment: f64) -> Self {
    Self {
      paid_amount: Some((loan.paid_amount + payment).min(loan.amount)),
      ..Self::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_employee_from_server_json() {
    let employee: Employee = serde_json::from_value(json!({
      "_id": "65f1c2a9e4b0a1b2c3d4e5f6",
      "employeeId": "EMP001",
      "name": "Ada",
      "email": "ada@example.com",
      "department": "Engineering",
      "salary": 85000,
      "status": "on-leave",
      "joinDate": "2023-04-01T00:00:00Z",
      "__v": 0
    }))
    .unwrap();

    assert_eq!(employee.id, "65f1c2a9e4b0a1b2c3d4e5f6");
    assert_eq!(employee.employee_id, "EMP001");
    assert_eq!(employee.status, EmployeeStatus::OnLeave);
    assert_eq!(employee.salary, 85000.0);
    assert_eq!(employee.position, "");
    assert!(employee.join_date.is_some());
  }

  #[test]
  fn test_employee_patch_only_sends_supplied_fields() {
    let patch = EmployeePatch {
      status: Some(EmployeeStatus::Inactive),
      ..EmployeePatch::default()
    };
    assert_eq!(
      serde_json::to_value(&patch).unwrap(),
      json!({ "status": "inactive" })
    );
  }

  #[test]
  fn test_loan_with_populated_employee() {
    let loan: Loan = serde_json::from_value(json!({
      "_id": "L1",
      "employee": { "_id": "E1", "name": "Ada", "employeeId": "EMP001" },
      "amount": 1000,
      "status": "approved",
      "paidAmount": 250
    }))
    .unwrap();

    assert_eq!(loan.employee.id(), "E1");
    assert_eq!(loan.employee.label(), "Ada");
    assert_eq!(loan.status, LoanStatus::Approved);
    assert_eq!(loan.remaining(), 750.0);
  }

  #[test]
  fn test_loan_with_employee_id_only() {
    let loan: Loan = serde_json::from_value(json!({
      "_id": "L2",
      "employee": "E7",
      "amount": 500
    }))
    .unwrap();

    assert_eq!(loan.employee, EmployeeRef::Id("E7".to_string()));
    assert_eq!(loan.employee.label(), "E7");
    assert_eq!(loan.status, LoanStatus::Pending);
    assert_eq!(loan.paid_amount, 0.0);
  }

  #[test]
  fn test_repayment_is_capped_at_amount() {
    let loan: Loan = serde_json::from_value(json!({
      "_id": "L3",
      "employee": "E1",
      "amount": 300,
      "paidAmount": 200
    }))
    .unwrap();

    assert_eq!(LoanPatch::repayment(&loan, 50.0).paid_amount, Some(250.0));
    assert_eq!(LoanPatch::repayment(&loan, 500.0).paid_amount, Some(300.0));
  }
}
