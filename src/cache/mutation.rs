//! Bookkeeping for in-flight optimistic mutations.

use serde_json::Value;
use std::fmt;

use super::error::MutationError;

/// Prefix of locally synthesized ids. Server ids never contain `:`.
pub const PLACEHOLDER_PREFIX: &str = "optimistic:";

/// Build the placeholder id for the `n`th create issued by a cache.
pub fn placeholder_id(n: u64) -> String {
  format!("{}{}", PLACEHOLDER_PREFIX, n)
}

/// Whether `id` was synthesized locally and not yet replaced by a server id.
pub fn is_placeholder(id: &str) -> bool {
  id.starts_with(PLACEHOLDER_PREFIX)
}

/// Kind of mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
  Create,
  Update,
  Delete,
  StatusChange,
}

impl fmt::Display for MutationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      MutationKind::Create => "create",
      MutationKind::Update => "update",
      MutationKind::Delete => "delete",
      MutationKind::StatusChange => "status change",
    };
    f.write_str(label)
  }
}

/// Handle for one mutation call, unique within a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationId(pub(crate) u64);

impl fmt::Display for MutationId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Folds the server's copy of an entity into the local one on success.
pub(crate) type Reconcile<E> = fn(&mut E, E);

/// An issued mutation waiting for its network result.
#[derive(Debug, Clone)]
pub struct PendingMutation<E> {
  pub kind: MutationKind,
  /// Target id (the placeholder for creates)
  pub target: String,
  /// Request body as sent, for display and logs
  pub payload: Value,
  /// Collection as it was right before the optimistic edit
  pub(crate) snapshot: Vec<E>,
  pub(crate) reconcile: Option<Reconcile<E>>,
}

/// Settled result of a mutation, delivered to the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
  pub id: MutationId,
  pub kind: MutationKind,
  pub target: String,
  pub result: Result<(), MutationError>,
}

impl MutationOutcome {
  pub fn is_success(&self) -> bool {
    self.result.is_ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_placeholder_ids_are_recognised() {
    let id = placeholder_id(3);
    assert_eq!(id, "optimistic:3");
    assert!(is_placeholder(&id));
  }

  #[test]
  fn test_server_ids_are_not_placeholders() {
    assert!(!is_placeholder("65f1c2a9e4b0a1b2c3d4e5f6"));
    assert!(!is_placeholder("E1"));
  }
}
