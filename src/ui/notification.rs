use crate::cache::{MutationKind, MutationOutcome};
use crate::permissions::Capability;
use std::time::{Duration, Instant};

/// How long a notification stays in the footer
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Success,
  Info,
  Failure,
}

/// Transient message shown in the footer
#[derive(Debug, Clone)]
pub struct Notification {
  pub level: Level,
  pub message: String,
  shown_at: Instant,
}

impl Notification {
  pub fn new(level: Level, message: impl Into<String>) -> Self {
    Self {
      level,
      message: message.into(),
      shown_at: Instant::now(),
    }
  }

  pub fn info(message: impl Into<String>) -> Self {
    Self::new(Level::Info, message)
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self::new(Level::Failure, message)
  }

  pub fn denied(capability: Capability) -> Self {
    Self::failure(format!("Not permitted: {}", capability))
  }

  /// Describe a settled mutation on a list of `noun`s (e.g., "Employee")
  pub fn from_outcome(noun: &str, outcome: &MutationOutcome) -> Self {
    match &outcome.result {
      Ok(()) => {
        let verb = match outcome.kind {
          MutationKind::Create => "created",
          MutationKind::Update => "updated",
          MutationKind::Delete => "deleted",
          MutationKind::StatusChange => "status updated",
        };
        Self::new(Level::Success, format!("{} {}", noun, verb))
      }
      Err(e) => Self::failure(format!(
        "{} {} failed, change reverted: {}",
        noun, outcome.kind, e.source
      )),
    }
  }

  pub fn is_expired(&self) -> bool {
    self.shown_at.elapsed() >= NOTIFICATION_TTL
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{ApiError, MutationError, MutationId};

  fn outcome(kind: MutationKind, result: Result<(), ApiError>) -> MutationOutcome {
    let target = "L1".to_string();
    MutationOutcome {
      id: MutationId(1),
      kind,
      target: target.clone(),
      result: result.map_err(|source| MutationError {
        kind,
        target,
        source,
      }),
    }
  }

  #[test]
  fn test_success_message() {
    let n = Notification::from_outcome("Loan", &outcome(MutationKind::StatusChange, Ok(())));
    assert_eq!(n.level, Level::Success);
    assert_eq!(n.message, "Loan status updated");
    assert!(!n.is_expired());
  }

  #[test]
  fn test_failure_message_mentions_rollback_and_reason() {
    let n = Notification::from_outcome(
      "Employee",
      &outcome(
        MutationKind::Delete,
        Err(ApiError::http(404, "Employee not found")),
      ),
    );
    assert_eq!(n.level, Level::Failure);
    assert_eq!(
      n.message,
      "Employee delete failed, change reverted: Employee not found"
    );
  }

  #[test]
  fn test_denied() {
    let n = Notification::denied(Capability::ApproveLoans);
    assert_eq!(n.message, "Not permitted: approve loans");
  }
}
