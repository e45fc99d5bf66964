//! In-memory network adapter for cache tests.
//!
//! `get_all` answers immediately from a configurable list, or parks until
//! `resolve_fetch` once `hold_fetches` is called. Every mutation call is
//! recorded and parked until the test resolves it with `resolve_next`, so
//! tests decide exactly when and how each request settles.

use futures::future::{self, BoxFuture};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use super::error::ApiError;
use super::traits::{Entity, EntityApi, StatusApi, StatusEntity};

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
  pub id: String,
  pub name: String,
  pub status: String,
}

pub fn item(id: &str, name: &str) -> Item {
  Item {
    id: id.to_string(),
    name: name.to_string(),
    status: "pending".to_string(),
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemDraft {
  pub name: String,
}

impl ItemDraft {
  pub fn named(name: &str) -> Self {
    Self {
      name: name.to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemPatch {
  pub name: Option<String>,
}

impl ItemPatch {
  pub fn name(name: &str) -> Self {
    Self {
      name: Some(name.to_string()),
    }
  }
}

impl Entity for Item {
  type Draft = ItemDraft;
  type Patch = ItemPatch;

  fn id(&self) -> &str {
    &self.id
  }

  fn provisional(id: String, draft: &ItemDraft) -> Self {
    Item {
      id,
      name: draft.name.clone(),
      status: "pending".to_string(),
    }
  }

  fn apply_patch(&mut self, patch: &ItemPatch) {
    if let Some(name) = &patch.name {
      self.name = name.clone();
    }
  }

  fn entity_type() -> &'static str {
    "item"
  }
}

impl StatusEntity for Item {
  type Status = String;

  fn status(&self) -> &String {
    &self.status
  }

  fn set_status(&mut self, status: String) {
    self.status = status;
  }
}

type Reply = Result<Option<Item>, ApiError>;
type FetchReply = Result<Vec<Item>, ApiError>;

#[derive(Default)]
struct Script {
  items: Vec<Item>,
  fetch_failure: Option<ApiError>,
  get_all_calls: usize,
  hold_fetches: bool,
  /// Parked `get_all` calls by issue index
  fetches: HashMap<usize, oneshot::Sender<FetchReply>>,
  calls: Vec<String>,
  waiting: VecDeque<oneshot::Sender<Reply>>,
}

#[derive(Clone, Default)]
pub struct ScriptedApi {
  script: Arc<Mutex<Script>>,
}

impl ScriptedApi {
  pub fn with_items(items: Vec<Item>) -> Self {
    let api = Self::default();
    api.set_items(items);
    api
  }

  pub fn set_items(&self, items: Vec<Item>) {
    self.script.lock().unwrap().items = items;
  }

  pub fn fail_fetch(&self, error: ApiError) {
    self.script.lock().unwrap().fetch_failure = Some(error);
  }

  pub fn clear_fetch_failure(&self) {
    self.script.lock().unwrap().fetch_failure = None;
  }

  /// Park every later `get_all` call until `resolve_fetch`.
  pub fn hold_fetches(&self) {
    self.script.lock().unwrap().hold_fetches = true;
  }

  /// Settle the held `get_all` call with 0-based issue index `call`.
  pub fn resolve_fetch(&self, call: usize, reply: FetchReply) {
    let sender = self
      .script
      .lock()
      .unwrap()
      .fetches
      .remove(&call)
      .expect("no fetch held with that index");
    sender.send(reply).expect("fetch was dropped");
  }

  pub fn get_all_calls(&self) -> usize {
    self.script.lock().unwrap().get_all_calls
  }

  /// Mutation calls in issue order, e.g. "update E1"
  pub fn calls(&self) -> Vec<String> {
    self.script.lock().unwrap().calls.clone()
  }

  /// Settle the oldest unresolved mutation call.
  pub fn resolve_next(&self, reply: Reply) {
    let sender = self
      .script
      .lock()
      .unwrap()
      .waiting
      .pop_front()
      .expect("no mutation call waiting");
    sender.send(reply).expect("mutation call was dropped");
  }

  fn park(&self, call: String) -> BoxFuture<'static, Reply> {
    let (tx, rx) = oneshot::channel();
    let mut script = self.script.lock().unwrap();
    script.calls.push(call);
    script.waiting.push_back(tx);
    Box::pin(async move {
      rx.await
        .unwrap_or_else(|_| Err(ApiError::new("request abandoned")))
    })
  }

  fn park_entity(&self, call: String) -> BoxFuture<'static, Result<Item, ApiError>> {
    let reply = self.park(call);
    Box::pin(async move {
      reply
        .await?
        .ok_or_else(|| ApiError::new("empty response"))
    })
  }
}

impl EntityApi<Item> for ScriptedApi {
  fn get_all(&self) -> BoxFuture<'static, Result<Vec<Item>, ApiError>> {
    let mut script = self.script.lock().unwrap();
    let call = script.get_all_calls;
    script.get_all_calls += 1;

    if script.hold_fetches {
      let (tx, rx) = oneshot::channel();
      script.fetches.insert(call, tx);
      return Box::pin(async move {
        rx.await
          .unwrap_or_else(|_| Err(ApiError::new("request abandoned")))
      });
    }

    let reply = match &script.fetch_failure {
      Some(error) => Err(error.clone()),
      None => Ok(script.items.clone()),
    };
    Box::pin(future::ready(reply))
  }

  fn create(&self, draft: ItemDraft) -> BoxFuture<'static, Result<Item, ApiError>> {
    self.park_entity(format!("create {}", draft.name))
  }

  fn update(&self, id: String, _patch: ItemPatch) -> BoxFuture<'static, Result<Item, ApiError>> {
    self.park_entity(format!("update {}", id))
  }

  fn delete(&self, id: String) -> BoxFuture<'static, Result<(), ApiError>> {
    let reply = self.park(format!("delete {}", id));
    Box::pin(async move { reply.await.map(|_| ()) })
  }
}

impl StatusApi<Item> for ScriptedApi {
  fn change_status(&self, id: String, status: String) -> BoxFuture<'static, Result<Item, ApiError>> {
    self.park_entity(format!("status {} {}", id, status))
  }
}
