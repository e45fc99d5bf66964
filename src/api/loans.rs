//! Loan list wiring: cache entity impl and network adapter.

use futures::future::BoxFuture;
use serde::Serialize;

use crate::cache::{ApiError, CollectionCache, Entity, EntityApi, StatusApi, StatusEntity};

use super::client::PayzenixClient;
use super::types::{EmployeeRef, Loan, LoanDraft, LoanPatch, LoanStatus};

pub type LoanCache = CollectionCache<Loan, LoansApi>;

impl Entity for Loan {
  type Draft = LoanDraft;
  type Patch = LoanPatch;

  fn id(&self) -> &str {
    &self.id
  }

  fn provisional(id: String, draft: &LoanDraft) -> Self {
    Loan {
      id,
      employee: EmployeeRef::Id(draft.employee.clone()),
      amount: draft.amount,
      status: LoanStatus::Pending,
      paid_amount: 0.0,
      reason: draft.reason.clone(),
      created_at: None,
    }
  }

  fn apply_patch(&mut self, patch: &LoanPatch) {
    if let Some(amount) = patch.amount {
      self.amount = amount;
    }
    if let Some(paid_amount) = patch.paid_amount {
      self.paid_amount = paid_amount;
    }
    if let Some(reason) = &patch.reason {
      self.reason = Some(reason.clone());
    }
  }

  fn entity_type() -> &'static str {
    "loan"
  }
}

impl StatusEntity for Loan {
  type Status = LoanStatus;

  fn status(&self) -> &LoanStatus {
    &self.status
  }

  fn set_status(&mut self, status: LoanStatus) {
    self.status = status;
  }
}

/// `/api/loans` endpoints
#[derive(Clone)]
pub struct LoansApi {
  client: PayzenixClient,
}

impl LoansApi {
  pub fn new(client: PayzenixClient) -> Self {
    Self { client }
  }
}

impl EntityApi<Loan> for LoansApi {
  fn get_all(&self) -> BoxFuture<'static, Result<Vec<Loan>, ApiError>> {
    let client = self.client.clone();
    Box::pin(async move { client.get("api/loans").await })
  }

  fn create(&self, draft: LoanDraft) -> BoxFuture<'static, Result<Loan, ApiError>> {
    let client = self.client.clone();
    Box::pin(async move { client.post("api/loans", &draft).await })
  }

  fn update(&self, id: String, patch: LoanPatch) -> BoxFuture<'static, Result<Loan, ApiError>> {
    let client = self.client.clone();
    Box::pin(async move { client.put(&format!("api/loans/{}", id), &patch).await })
  }

  fn delete(&self, id: String) -> BoxFuture<'static, Result<(), ApiError>> {
    let client = self.client.clone();
    Box::pin(async move { client.delete(&format!("api/loans/{}", id)).await })
  }
}

/// Body of `PATCH /api/loans/{id}/status`
#[derive(Serialize)]
struct StatusBody {
  status: LoanStatus,
}

impl StatusApi<Loan> for LoansApi {
  fn change_status(
    &self,
    id: String,
    status: LoanStatus,
  ) -> BoxFuture<'static, Result<Loan, ApiError>> {
    let client = self.client.clone();
    Box::pin(async move {
      client
        .patch(&format!("api/loans/{}/status", id), &StatusBody { status })
        .await
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_provisional_loan_is_pending_and_unpaid() {
    let draft = LoanDraft {
      employee: "E1".to_string(),
      amount: 1200.0,
      reason: Some("Laptop".to_string()),
    };
    let loan = Loan::provisional("optimistic:4".to_string(), &draft);

    assert_eq!(loan.status, LoanStatus::Pending);
    assert_eq!(loan.paid_amount, 0.0);
    assert_eq!(loan.employee.id(), "E1");
    assert_eq!(loan.remaining(), 1200.0);
  }

  #[test]
  fn test_repayment_patch_updates_paid_amount_only() {
    let mut loan = Loan::provisional(
      "L1".to_string(),
      &LoanDraft {
        employee: "E1".to_string(),
        amount: 1000.0,
        reason: None,
      },
    );
    loan.status = LoanStatus::Approved;

    let patch = LoanPatch::repayment(&loan, 400.0);
    loan.apply_patch(&patch);

    assert_eq!(loan.paid_amount, 400.0);
    assert_eq!(loan.amount, 1000.0);
    assert_eq!(loan.status, LoanStatus::Approved);
  }
}
