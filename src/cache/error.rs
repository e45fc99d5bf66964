//! Error types surfaced by the cache and its network adapters.

use thiserror::Error;

use super::mutation::MutationKind;

/// Failure reported by a network adapter.
///
/// `status` is the HTTP status when the server answered; transport and
/// decode failures carry none.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
  pub status: Option<u16>,
  pub message: String,
}

impl ApiError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      status: None,
      message: message.into(),
    }
  }

  pub fn http(status: u16, message: impl Into<String>) -> Self {
    Self {
      status: Some(status),
      message: message.into(),
    }
  }
}

/// Loading the collection failed. The cached items are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load {entity_type} list: {source}")]
pub struct FetchError {
  pub entity_type: &'static str,
  #[source]
  pub source: ApiError,
}

/// A mutation failed and its optimistic edit was rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} of {target} failed: {source}")]
pub struct MutationError {
  pub kind: MutationKind,
  pub target: String,
  #[source]
  pub source: ApiError,
}
