//! Optimistic collection cache.
//!
//! `CollectionCache<E, A>` mirrors a server-held list of `E` and applies user
//! mutations to the local copy before the server confirms them. Every
//! mutation snapshots the list first; a failed request restores that snapshot,
//! a successful one folds the server's record into the list in place.
//!
//! Network calls run on spawned tasks and report back over a channel. All
//! state changes happen on the owner's side, in `poll()`, `next_outcome()`
//! or `fetch_all()`.
//!
//! ```ignore
//! let mut loans = CollectionCache::new(LoansApi::new(client), CacheOptions::default());
//! loans.fetch();
//!
//! // On user action - the list changes immediately
//! loans.change_status(&loan_id, LoanStatus::Approved);
//!
//! // In event loop tick
//! for outcome in loans.poll() {
//!     notify(outcome);
//! }
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::error::{ApiError, FetchError, MutationError};
use super::mutation::{
  placeholder_id, MutationId, MutationKind, MutationOutcome, PendingMutation, Reconcile,
};
use super::traits::{Entity, EntityApi, StatusApi, StatusEntity};

/// Which external refresh signals may trigger a refetch of stale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefetchTriggers {
  pub on_focus: bool,
  pub on_reconnect: bool,
}

impl Default for RefetchTriggers {
  fn default() -> Self {
    Self {
      on_focus: true,
      on_reconnect: false,
    }
  }
}

/// External signal delivered by the host (terminal focus, network back up)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSignal {
  Focus,
  Reconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
  /// How long after a successful fetch the list is served without refetching
  pub stale_time: Duration,
  pub refetch: RefetchTriggers,
}

impl Default for CacheOptions {
  fn default() -> Self {
    Self {
      stale_time: Duration::from_secs(5 * 60),
      refetch: RefetchTriggers::default(),
    }
  }
}

impl CacheOptions {
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  pub fn with_refetch(mut self, refetch: RefetchTriggers) -> Self {
    self.refetch = refetch;
    self
  }
}

/// The state of the list load
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
  /// Nothing fetched yet
  Idle,
  /// A fetch is in flight
  Loading,
  /// Last fetch succeeded
  Ready,
  /// Last fetch failed; items hold the last-known-good list
  Error(FetchError),
}

/// Message from a spawned network task back to the cache owner
enum Completion<E> {
  Fetched {
    generation: u64,
    result: Result<Vec<E>, ApiError>,
  },
  Mutated {
    id: MutationId,
    result: Result<Option<E>, ApiError>,
  },
}

/// Client-side mirror of a server collection with optimistic mutations.
pub struct CollectionCache<E: Entity, A: EntityApi<E>> {
  api: A,
  items: Vec<E>,
  state: FetchState,
  fetched_at: Option<Instant>,
  invalidated: bool,
  options: CacheOptions,
  fetch_generation: u64,
  /// A load is owed once the pending mutations settle
  deferred_fetch: bool,
  /// Last response was a transport failure (no HTTP status)
  offline: bool,
  reconnected: bool,
  pending: BTreeMap<MutationId, PendingMutation<E>>,
  next_id: u64,
  settled: VecDeque<MutationOutcome>,
  tx: mpsc::UnboundedSender<Completion<E>>,
  rx: mpsc::UnboundedReceiver<Completion<E>>,
}

impl<E: Entity, A: EntityApi<E>> CollectionCache<E, A> {
  /// Create an empty cache. Nothing is fetched until `fetch()` or `fetch_all()`.
  pub fn new(api: A, options: CacheOptions) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      api,
      items: Vec::new(),
      state: FetchState::Idle,
      fetched_at: None,
      invalidated: false,
      options,
      fetch_generation: 0,
      deferred_fetch: false,
      offline: false,
      reconnected: false,
      pending: BTreeMap::new(),
      next_id: 0,
      settled: VecDeque::new(),
      tx,
      rx,
    }
  }

  /// Current best-known list
  pub fn items(&self) -> &[E] {
    &self.items
  }

  pub fn get(&self, id: &str) -> Option<&E> {
    self.items.iter().find(|e| e.id() == id)
  }

  pub fn state(&self) -> &FetchState {
    &self.state
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.state, FetchState::Loading)
  }

  pub fn fetch_error(&self) -> Option<&FetchError> {
    match &self.state {
      FetchState::Error(e) => Some(e),
      _ => None,
    }
  }

  pub fn options(&self) -> &CacheOptions {
    &self.options
  }

  /// Whether the list should be refetched before it is trusted again.
  pub fn is_stale(&self) -> bool {
    match self.fetched_at {
      Some(at) => self.invalidated || at.elapsed() >= self.options.stale_time,
      None => true,
    }
  }

  /// Whether any mutation of `kind` is still in flight.
  pub fn is_pending(&self, kind: MutationKind) -> bool {
    self.pending.values().any(|p| p.kind == kind)
  }

  pub fn pending_count(&self) -> usize {
    self.pending.len()
  }

  /// In-flight mutations, oldest first
  pub fn pending(&self) -> impl Iterator<Item = &PendingMutation<E>> {
    self.pending.values()
  }

  /// Start a background fetch if the list is missing or stale.
  ///
  /// No-op while a fetch is in flight or after a failed fetch; a failed load
  /// is only retried through `refetch()` or `fetch_all()`. Returns `true` if a
  /// fetch was started, or queued behind pending mutations.
  pub fn fetch(&mut self) -> bool {
    match self.state {
      FetchState::Loading | FetchState::Error(_) => false,
      FetchState::Ready if !self.is_stale() => false,
      _ => {
        self.start_fetch();
        true
      }
    }
  }

  /// Force a fetch, superseding any fetch still in flight.
  ///
  /// While mutations are pending the fetch waits until they have all settled.
  pub fn refetch(&mut self) {
    self.start_fetch();
  }

  /// Mark the list stale so the next `fetch()` goes to the network.
  pub fn invalidate(&mut self) {
    self.invalidated = true;
  }

  /// Handle an external refresh signal. Refetches only if the signal is
  /// enabled and the data is stale. A reconnect also retries a load that
  /// failed to reach the server. Returns `true` if a fetch was issued.
  pub fn signal(&mut self, signal: RefreshSignal) -> bool {
    let enabled = match signal {
      RefreshSignal::Focus => self.options.refetch.on_focus,
      RefreshSignal::Reconnect => self.options.refetch.on_reconnect,
    };
    if !enabled {
      return false;
    }

    let unreachable = matches!(&self.state, FetchState::Error(e) if e.source.status.is_none());
    if signal == RefreshSignal::Reconnect && unreachable {
      self.start_fetch();
      return true;
    }
    self.fetch()
  }

  /// Whether the last response was a transport failure
  pub fn is_offline(&self) -> bool {
    self.offline
  }

  /// Whether a response arrived after a transport failure since the last call.
  pub fn take_reconnected(&mut self) -> bool {
    std::mem::take(&mut self.reconnected)
  }

  /// Return the list, loading it from the network if missing or stale.
  ///
  /// Calling this after a failed load retries it. With mutations pending it
  /// waits for them to settle before the load runs. Mutation outcomes that
  /// arrive while waiting are kept for the next `poll()`.
  pub async fn fetch_all(&mut self) -> Result<&[E], FetchError> {
    if matches!(self.state, FetchState::Error(_)) {
      self.start_fetch();
    } else {
      self.fetch();
    }

    while self.is_loading() {
      match self.rx.recv().await {
        Some(completion) => self.apply(completion),
        None => break,
      }
    }

    match &self.state {
      FetchState::Error(e) => Err(e.clone()),
      _ => Ok(&self.items),
    }
  }

  /// Apply every completion that has already arrived, without waiting.
  ///
  /// Returns the mutations that settled since the last call. Call this in
  /// the event loop tick handler.
  pub fn poll(&mut self) -> Vec<MutationOutcome> {
    while let Ok(completion) = self.rx.try_recv() {
      self.apply(completion);
    }
    self.settled.drain(..).collect()
  }

  /// Wait for the next mutation to settle. Returns `None` once nothing is in flight.
  pub async fn next_outcome(&mut self) -> Option<MutationOutcome> {
    loop {
      if let Some(outcome) = self.settled.pop_front() {
        return Some(outcome);
      }
      if self.pending.is_empty() {
        return None;
      }
      let completion = self.rx.recv().await?;
      self.apply(completion);
    }
  }

  /// Append a provisional entity and issue the create request.
  pub fn create(&mut self, draft: E::Draft) -> MutationId {
    let id = self.begin_mutation();
    let placeholder = placeholder_id(id.0);
    let snapshot = self.items.clone();

    self
      .items
      .push(E::provisional(placeholder.clone(), &draft));
    debug!(
      entity = E::entity_type(),
      id = %placeholder,
      "optimistic create applied"
    );

    let request = self.api.create(draft.clone());
    self.track(
      id,
      MutationKind::Create,
      placeholder,
      serde_json::to_value(&draft).unwrap_or_default(),
      snapshot,
      Some(replace::<E> as Reconcile<E>),
    );
    self.dispatch(id, async move { request.await.map(Some) });
    id
  }

  /// Merge `patch` into the entity with `target` and issue the update request.
  ///
  /// An id that is not cached leaves the list as is; the request is still sent.
  pub fn update(&mut self, target: &str, patch: E::Patch) -> MutationId {
    let id = self.begin_mutation();
    let snapshot = self.items.clone();

    match self.items.iter_mut().find(|e| e.id() == target) {
      Some(entity) => {
        entity.apply_patch(&patch);
        debug!(entity = E::entity_type(), id = target, "optimistic update applied");
      }
      None => debug!(
        entity = E::entity_type(),
        id = target,
        "update target not cached, sending request anyway"
      ),
    }

    let request = self.api.update(target.to_string(), patch.clone());
    self.track(
      id,
      MutationKind::Update,
      target.to_string(),
      serde_json::to_value(&patch).unwrap_or_default(),
      snapshot,
      Some(replace::<E> as Reconcile<E>),
    );
    self.dispatch(id, async move { request.await.map(Some) });
    id
  }

  /// Remove the entity with `target` and issue the delete request.
  pub fn delete(&mut self, target: &str) -> MutationId {
    let id = self.begin_mutation();
    let snapshot = self.items.clone();

    self.items.retain(|e| e.id() != target);
    debug!(entity = E::entity_type(), id = target, "optimistic delete applied");

    let request = self.api.delete(target.to_string());
    self.track(
      id,
      MutationKind::Delete,
      target.to_string(),
      serde_json::Value::Null,
      snapshot,
      None,
    );
    self.dispatch(id, async move { request.await.map(|()| None) });
    id
  }

  /// Allocate an id for a mutation about to edit the list.
  ///
  /// A fetch in flight may have read the server before this edit and would
  /// undo it when it lands, so its result is dropped and the load is redone
  /// once nothing is pending.
  fn begin_mutation(&mut self) -> MutationId {
    if self.is_loading() && !self.deferred_fetch {
      self.fetch_generation += 1;
      self.deferred_fetch = true;
      debug!(
        entity = E::entity_type(),
        "in-flight fetch superseded by optimistic edit"
      );
    }

    self.next_id += 1;
    MutationId(self.next_id)
  }

  fn track(
    &mut self,
    id: MutationId,
    kind: MutationKind,
    target: String,
    payload: serde_json::Value,
    snapshot: Vec<E>,
    reconcile: Option<Reconcile<E>>,
  ) {
    self.pending.insert(
      id,
      PendingMutation {
        kind,
        target,
        payload,
        snapshot,
        reconcile,
      },
    );
  }

  fn dispatch<F>(&self, id: MutationId, request: F)
  where
    F: Future<Output = Result<Option<E>, ApiError>> + Send + 'static,
  {
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = request.await;
      // Ignore send errors - the cache may have been dropped
      let _ = tx.send(Completion::Mutated { id, result });
    });
  }

  fn start_fetch(&mut self) {
    self.fetch_generation += 1;
    self.state = FetchState::Loading;

    if !self.pending.is_empty() {
      debug!(
        entity = E::entity_type(),
        pending = self.pending.len(),
        "fetch deferred until mutations settle"
      );
      self.deferred_fetch = true;
      return;
    }

    let generation = self.fetch_generation;
    let request = self.api.get_all();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = request.await;
      let _ = tx.send(Completion::Fetched { generation, result });
    });
  }

  fn apply(&mut self, completion: Completion<E>) {
    match completion {
      Completion::Fetched { generation, result } => self.apply_fetch(generation, result),
      Completion::Mutated { id, result } => {
        if let Some(outcome) = self.apply_mutation(id, result) {
          self.settled.push_back(outcome);
        }
      }
    }
  }

  fn apply_fetch(&mut self, generation: u64, result: Result<Vec<E>, ApiError>) {
    self.note_reachability(&result);

    if generation != self.fetch_generation {
      debug!(
        entity = E::entity_type(),
        generation, "discarding superseded fetch"
      );
      return;
    }

    match result {
      Ok(items) => {
        debug!(entity = E::entity_type(), count = items.len(), "list fetched");
        self.items = items;
        self.fetched_at = Some(Instant::now());
        self.invalidated = false;
        self.state = FetchState::Ready;
      }
      Err(source) => {
        warn!(entity = E::entity_type(), error = %source, "list fetch failed");
        self.state = FetchState::Error(FetchError {
          entity_type: E::entity_type(),
          source,
        });
      }
    }
  }

  fn apply_mutation(
    &mut self,
    id: MutationId,
    result: Result<Option<E>, ApiError>,
  ) -> Option<MutationOutcome> {
    let pending = self.pending.remove(&id)?;
    self.note_reachability(&result);

    let result = match result {
      Ok(server) => {
        if let (Some(server), Some(reconcile)) = (server, pending.reconcile) {
          match self.items.iter().position(|e| e.id() == pending.target) {
            Some(idx) => reconcile(&mut self.items[idx], server),
            None if pending.kind == MutationKind::Create => {
              // An earlier rollback dropped the placeholder; keep the confirmed record
              if !self.items.iter().any(|e| e.id() == server.id()) {
                debug!(
                  entity = E::entity_type(),
                  id = server.id(),
                  "placeholder gone, appending created entity"
                );
                self.items.push(server);
              }
            }
            None => {}
          }
        }
        Ok(())
      }
      Err(source) => {
        warn!(
          entity = E::entity_type(),
          kind = %pending.kind,
          id = %pending.target,
          error = %source,
          "mutation failed, rolling back"
        );
        self.items = pending.snapshot;
        Err(MutationError {
          kind: pending.kind,
          target: pending.target.clone(),
          source,
        })
      }
    };

    if self.pending.is_empty() && self.deferred_fetch {
      self.deferred_fetch = false;
      self.start_fetch();
    }

    Some(MutationOutcome {
      id,
      kind: pending.kind,
      target: pending.target,
      result,
    })
  }

  fn note_reachability<T>(&mut self, result: &Result<T, ApiError>) {
    let unreachable = matches!(result, Err(e) if e.status.is_none());
    if unreachable {
      if !self.offline {
        warn!(entity = E::entity_type(), "server unreachable");
      }
      self.offline = true;
    } else if self.offline {
      info!(entity = E::entity_type(), "server reachable again");
      self.offline = false;
      self.reconnected = true;
    }
  }
}

impl<E: StatusEntity, A: StatusApi<E>> CollectionCache<E, A> {
  /// Set the status of `target` in place and issue the status change request.
  ///
  /// On success the optimistic status stays unless the server reports a
  /// different one.
  pub fn change_status(&mut self, target: &str, status: E::Status) -> MutationId {
    let id = self.begin_mutation();
    let snapshot = self.items.clone();

    if let Some(entity) = self.items.iter_mut().find(|e| e.id() == target) {
      entity.set_status(status.clone());
      debug!(
        entity = E::entity_type(),
        id = target,
        status = ?status,
        "optimistic status change applied"
      );
    }

    let request = self.api.change_status(target.to_string(), status.clone());
    self.track(
      id,
      MutationKind::StatusChange,
      target.to_string(),
      serde_json::to_value(&status)
        .map(|status| serde_json::json!({ "status": status }))
        .unwrap_or_default(),
      snapshot,
      Some(reconcile_status::<E> as Reconcile<E>),
    );
    self.dispatch(id, async move { request.await.map(Some) });
    id
  }
}

fn replace<E>(local: &mut E, server: E) {
  *local = server;
}

fn reconcile_status<E: StatusEntity>(local: &mut E, server: E) {
  if local.status() != server.status() {
    local.set_status(server.status().clone());
  }
}
