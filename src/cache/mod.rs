//! Optimistic client-side cache for server-held entity lists.
//!
//! This module is entity-agnostic. It:
//! - Mirrors a server collection behind a staleness window
//! - Applies create/update/delete/status changes to the local list immediately
//! - Replaces optimistic guesses with the server's record on success
//! - Restores the pre-mutation snapshot on failure

mod collection;
mod error;
mod mutation;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use collection::{CacheOptions, CollectionCache, FetchState, RefetchTriggers, RefreshSignal};
pub use error::{ApiError, FetchError, MutationError};
pub use mutation::{is_placeholder, MutationId, MutationKind, MutationOutcome, PendingMutation};
pub use traits::{Entity, EntityApi, StatusApi, StatusEntity};
