//! Role to capability table.
//!
//! Each role lists exactly what it may do; roles do not inherit from each other.

use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Hr,
  Manager,
  #[default]
  Employee,
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Role::Admin => "admin",
      Role::Hr => "hr",
      Role::Manager => "manager",
      Role::Employee => "employee",
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
  ViewEmployees,
  ManageEmployees,
  ViewLoans,
  RequestLoans,
  ApproveLoans,
  RecordRepayments,
  DeleteLoans,
}

impl fmt::Display for Capability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Capability::ViewEmployees => "view employees",
      Capability::ManageEmployees => "manage employees",
      Capability::ViewLoans => "view loans",
      Capability::RequestLoans => "request loans",
      Capability::ApproveLoans => "approve loans",
      Capability::RecordRepayments => "record repayments",
      Capability::DeleteLoans => "delete loans",
    })
  }
}

use Capability::*;

const ADMIN: &[Capability] = &[
  ViewEmployees,
  ManageEmployees,
  ViewLoans,
  RequestLoans,
  ApproveLoans,
  RecordRepayments,
  DeleteLoans,
];

const HR: &[Capability] = &[
  ViewEmployees,
  ManageEmployees,
  ViewLoans,
  RequestLoans,
  ApproveLoans,
  RecordRepayments,
];

const MANAGER: &[Capability] = &[ViewEmployees, ViewLoans, ApproveLoans];

const EMPLOYEE: &[Capability] = &[ViewLoans, RequestLoans];

fn capabilities(role: Role) -> &'static [Capability] {
  match role {
    Role::Admin => ADMIN,
    Role::Hr => HR,
    Role::Manager => MANAGER,
    Role::Employee => EMPLOYEE,
  }
}

/// Whether `role` may exercise `capability`.
pub fn can(role: Role, capability: Capability) -> bool {
  capabilities(role).contains(&capability)
}
