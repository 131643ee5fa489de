//! Domain event system — decoupled observability for the runtime.
//!
//! Events are published when something interesting happens: a whisper
//! arrives, an action runs, a reply goes out, a conversation ends. Nothing in
//! the core control flow depends on subscribers existing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A whisper was dequeued for processing
    WhisperReceived {
        originator: String,
        text_preview: String,
        timestamp: DateTime<Utc>,
    },

    /// An action was invoked
    ActionInvoked {
        action_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A reply was sent to the originator
    ReplySent {
        originator: String,
        timestamp: DateTime<Utc>,
    },

    /// A conversation ended
    ConversationEnded {
        originator: String,
        iterations: u32,
        completed: bool,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub. Components
/// subscribe to receive all events and filter for what they care about.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
