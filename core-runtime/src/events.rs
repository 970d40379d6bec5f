//! # Event Bus
//!
//! Typed in-process event channel between the reconciliation engine and any
//! presentation layer, built on `tokio::sync::broadcast`.
//!
//! The engine's predecessor designs shuttled stage progress through a
//! line-based text protocol between subprocesses; this module replaces that
//! with strongly typed events delivered in-process. Subscribers consume a
//! [`SyncEvent`] stream; emitters never block and never fail the sync over a
//! missing listener.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::events::{EventBus, SyncEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(SyncEvent::Started {
//!     run_id: "run-1".to_string(),
//!     playlist_id: "PL123".to_string(),
//! })
//! .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert!(matches!(event, SyncEvent::Started { .. }));
//! # }
//! ```
//!
//! Slow subscribers receive `RecvError::Lagged(n)` and can keep reading;
//! `RecvError::Closed` signals shutdown.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Events emitted over one reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum SyncEvent {
    /// A pass started for a playlist.
    Started { run_id: String, playlist_id: String },

    /// The plan has been computed (also the final word in dry-run mode).
    PlanReady {
        run_id: String,
        already_present: u64,
        to_add: u64,
        to_replace: u64,
        removals: u64,
        skipped_worse: u64,
    },

    /// Periodic progress during mutation execution.
    Progress {
        run_id: String,
        processed: u64,
        total: u64,
        added: u64,
        replaced: u64,
        removed: u64,
        failed: u64,
        skipped_by_limit: u64,
    },

    /// The pass finished; `outcome` is the stable outcome name
    /// ("completed", "quota_exhausted", "auth_invalid", "failed").
    Completed {
        run_id: String,
        outcome: String,
        added: u64,
        replaced: u64,
        removed: u64,
        failed: u64,
    },
}

/// Broadcast channel for [`SyncEvent`]s.
///
/// Cheap to clone; all clones share the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Create an event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it. An `Err` only
    /// means nobody is listening; emitters treat that as fine (`.ok()`).
    pub fn emit(&self, event: SyncEvent) -> Result<usize, SendError<SyncEvent>> {
        self.sender.send(event)
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}
