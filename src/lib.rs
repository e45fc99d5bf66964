//! PayZenix terminal client.
//!
//! `cache` holds the optimistic collection cache; `api` adapts it to the
//! PayZenix REST endpoints; `app` and `ui` drive the terminal.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod event;
pub mod forms;
pub mod logging;
pub mod permissions;
pub mod ui;
