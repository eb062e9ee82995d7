//! # Change Notification
//!
//! Broadcast feed of register changes for external collaborators.
//!
//! ## Pull First, Push Second
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The query API is authoritative. This feed is advisory:                 │
//! │                                                                         │
//! │  Repository commit ──► RegisterEvents::publish ──► broadcast channel   │
//! │                                                         │               │
//! │                    subscriber 1 ◄───────────────────────┤               │
//! │                    subscriber 2 ◄───────────────────────┘               │
//! │                                                                         │
//! │  A lagging subscriber loses events (RecvError::Lagged) and must        │
//! │  re-query the store. No subscriber can block a writer.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core is transport-agnostic: whether an event ends up on a websocket,
//! an IPC channel, or nowhere at all is a presentation-layer concern.

use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::trace;

/// Default buffer size for the event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// Event Type
// =============================================================================

/// A change that committed to the store.
///
/// Events are emitted strictly after the owning transaction commits; an
/// aborted open/close/record never produces one.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegisterEvent {
    /// A session was opened on a register.
    SessionOpened {
        register_id: String,
        session_id: String,
    },
    /// A movement was appended to an open session.
    MovementRecorded {
        register_id: String,
        session_id: String,
        movement_id: String,
    },
    /// A session was reconciled and frozen.
    SessionClosed {
        register_id: String,
        session_id: String,
        difference_cents: i64,
    },
}

// =============================================================================
// Event Hub
// =============================================================================

/// Shared broadcast hub handed to every repository.
///
/// Cloning is cheap; all clones feed the same subscribers.
#[derive(Debug, Clone)]
pub struct RegisterEvents {
    tx: broadcast::Sender<RegisterEvent>,
}

impl RegisterEvents {
    /// Creates a hub with the default buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    /// Creates a hub with an explicit buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        RegisterEvents { tx }
    }

    /// Subscribes to future events.
    ///
    /// Events published before the subscription are not replayed;
    /// subscribers needing history must query the store.
    pub fn subscribe(&self) -> broadcast::Receiver<RegisterEvent> {
        self.tx.subscribe()
    }

    /// Subscribes and wraps the receiver as a `Stream`.
    pub fn stream(&self) -> BroadcastStream<RegisterEvent> {
        BroadcastStream::new(self.subscribe())
    }

    /// Publishes an event to all current subscribers.
    ///
    /// A send with zero subscribers is not an error; the feed is optional.
    pub fn publish(&self, event: RegisterEvent) {
        trace!(?event, "Publishing register event");
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers (diagnostics).
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for RegisterEvents {
    fn default() -> Self {
        RegisterEvents::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
