//! Core traits for entities held by the cache and the network adapters behind it.

use futures::future::BoxFuture;
use serde::Serialize;
use std::fmt::Debug;

use super::error::ApiError;

/// Trait for entities that can live in a cached collection.
///
/// Implementors provide a stable identifier plus the two payload shapes the
/// cache sends to the server: a `Draft` for create and a `Patch` for update.
pub trait Entity: Clone + Debug + PartialEq + Send + Sync + 'static {
  /// Create payload
  type Draft: Clone + Debug + Serialize + Send + Sync + 'static;
  /// Update payload, merged shallowly (only supplied fields change)
  type Patch: Clone + Debug + Serialize + Send + Sync + 'static;

  /// Unique identifier for this entity (server id or placeholder)
  fn id(&self) -> &str;

  /// Build the provisional record shown while a create is in flight.
  ///
  /// Attributes the draft does not supply take their defaults.
  fn provisional(id: String, draft: &Self::Draft) -> Self;

  /// Merge the supplied fields of `patch` into this record.
  fn apply_patch(&mut self, patch: &Self::Patch);

  /// Entity type name for logs and messages (e.g., "employee", "loan")
  fn entity_type() -> &'static str;
}

/// Entities with a status field that can be changed on its own.
pub trait StatusEntity: Entity {
  type Status: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static;

  fn status(&self) -> &Self::Status;

  fn set_status(&mut self, status: Self::Status);
}

/// Network adapter for one server-held collection.
///
/// Futures are boxed and `'static` so the cache can spawn them.
pub trait EntityApi<E: Entity>: Clone + Send + Sync + 'static {
  fn get_all(&self) -> BoxFuture<'static, Result<Vec<E>, ApiError>>;

  fn create(&self, draft: E::Draft) -> BoxFuture<'static, Result<E, ApiError>>;

  fn update(&self, id: String, patch: E::Patch) -> BoxFuture<'static, Result<E, ApiError>>;

  fn delete(&self, id: String) -> BoxFuture<'static, Result<(), ApiError>>;
}

/// Adapter for collections whose entities support status changes (approve/reject).
pub trait StatusApi<E: StatusEntity>: EntityApi<E> {
  fn change_status(
    &self,
    id: String,
    status: E::Status,
  ) -> BoxFuture<'static, Result<E, ApiError>>;
}
