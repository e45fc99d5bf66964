use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Terminal window regained focus
  FocusGained,
  /// Periodic tick for UI refresh and cache polling
  Tick,
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    spawn_ticker(tx.clone(), tick_rate);

    // Terminal reads block, keep them off the runtime workers
    tokio::task::spawn_blocking(move || loop {
      match event::poll(tick_rate) {
        Ok(true) => {}
        Ok(false) if tx.is_closed() => break,
        Ok(false) => continue,
        Err(_) => break,
      }

      let event = match event::read() {
        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
        Ok(CrosstermEvent::FocusGained) => Event::FocusGained,
        _ => continue,
      };

      if tx.send(event).is_err() {
        break;
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

/// Send `Event::Tick` every `tick_rate`, whatever the terminal is doing, so a
/// held key cannot hold back cache polling.
fn spawn_ticker(tx: mpsc::UnboundedSender<Event>, tick_rate: Duration) {
  tokio::spawn(async move {
    let mut interval = tokio::time::interval(tick_rate);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
      interval.tick().await;
      if tx.send(Event::Tick).is_err() {
        break;
      }
    }
  });
}
