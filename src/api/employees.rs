//! Employee list wiring: cache entity impl and network adapter.

use futures::future::BoxFuture;

use crate::cache::{ApiError, CollectionCache, Entity, EntityApi};

use super::client::PayzenixClient;
use super::types::{Employee, EmployeeDraft, EmployeePatch, EmployeeStatus};

pub type EmployeeCache = CollectionCache<Employee, EmployeesApi>;

impl Entity for Employee {
  type Draft = EmployeeDraft;
  type Patch = EmployeePatch;

  fn id(&self) -> &str {
    &self.id
  }

  fn provisional(id: String, draft: &EmployeeDraft) -> Self {
    Employee {
      id,
      employee_id: draft.employee_id.clone().unwrap_or_default(),
      name: draft.name.clone(),
      email: draft.email.clone(),
      department: draft.department.clone().unwrap_or_default(),
      position: draft.position.clone().unwrap_or_default(),
      salary: draft.salary.unwrap_or_default(),
      status: EmployeeStatus::Active,
      join_date: None,
    }
  }

  fn apply_patch(&mut self, patch: &EmployeePatch) {
    if let Some(name) = &patch.name {
      self.name = name.clone();
    }
    if let Some(email) = &patch.email {
      self.email = email.clone();
    }
    if let Some(department) = &patch.department {
      self.department = department.clone();
    }
    if let Some(position) = &patch.position {
      self.position = position.clone();
    }
    if let Some(salary) = patch.salary {
      self.salary = salary;
    }
    if let Some(status) = patch.status {
      self.status = status;
    }
  }

  fn entity_type() -> &'static str {
    "employee"
  }
}

/// `/api/employees` endpoints
#[derive(Clone)]
pub struct EmployeesApi {
  client: PayzenixClient,
}

impl EmployeesApi {
  pub fn new(client: PayzenixClient) -> Self {
    Self { client }
  }
}

impl EntityApi<Employee> for EmployeesApi {
  fn get_all(&self) -> BoxFuture<'static, Result<Vec<Employee>, ApiError>> {
    let client = self.client.clone();
    Box::pin(async move { client.get("api/employees").await })
  }

  fn create(&self, draft: EmployeeDraft) -> BoxFuture<'static, Result<Employee, ApiError>> {
    let client = self.client.clone();
    Box::pin(async move { client.post("api/employees", &draft).await })
  }

  fn update(
    &self,
    id: String,
    patch: EmployeePatch,
  ) -> BoxFuture<'static, Result<Employee, ApiError>> {
    let client = self.client.clone();
    Box::pin(async move { client.put(&format!("api/employees/{}", id), &patch).await })
  }

  fn delete(&self, id: String) -> BoxFuture<'static, Result<(), ApiError>> {
    let client = self.client.clone();
    Box::pin(async move { client.delete(&format!("api/employees/{}", id)).await })
  }
}
