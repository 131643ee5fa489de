//! Whisper and WhisperQueue domain types.
//!
//! A whisper is the unit of work for the whole runtime: an inbound private
//! message from a player. The queue is the only structure in the system that
//! needs synchronized concurrent access — any number of producers enqueue,
//! exactly one consumer loop drains in FIFO order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

/// An inbound private message from a player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Whisper {
    /// The player who sent it
    pub originator: String,

    /// The message text
    pub text: String,

    /// When it arrived
    pub received_at: DateTime<Utc>,
}

impl Whisper {
    pub fn new(originator: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            originator: originator.into(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

/// An unbounded, ordered, thread-safe buffer of inbound whispers.
///
/// `push` never blocks meaningfully and never rejects; `try_dequeue` never
/// blocks. A poisoned lock is recovered rather than propagated — losing the
/// queue over a panicked producer would violate the never-rejects contract.
#[derive(Debug, Default)]
pub struct WhisperQueue {
    inner: Mutex<VecDeque<Whisper>>,
}

impl WhisperQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a whisper at the tail.
    pub fn push(&self, whisper: Whisper) {
        tracing::debug!(originator = %whisper.originator, "Whisper enqueued");
        self.lock().push_back(whisper);
    }

    /// Fire-and-forget enqueue used by whatever observes whisper events.
    pub fn add(&self, originator: impl Into<String>, text: impl Into<String>) {
        self.push(Whisper::new(originator, text));
    }

    /// Remove and return the head, or `None` when empty. Never blocks.
    pub fn try_dequeue(&self) -> Option<Whisper> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Whisper>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn whisper_carries_timestamp() {
        let w = Whisper::new("Alice", "hello");
        assert_eq!(w.originator, "Alice");
        assert_eq!(w.text, "hello");
        assert!(w.received_at <= Utc::now());
    }

    #[test]
    fn queue_is_fifo() {
        let queue = WhisperQueue::new();
        queue.add("Alice", "first");
        queue.add("Bob", "second");
        queue.add("Alice", "third");

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_dequeue().unwrap().text, "first");
        assert_eq!(queue.try_dequeue().unwrap().text, "second");
        assert_eq!(queue.try_dequeue().unwrap().text, "third");
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn try_dequeue_on_empty_returns_none() {
        let queue = WhisperQueue::new();
        assert!(queue.is_empty());
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn concurrent_producers_do_not_corrupt_messages() {
        let queue = Arc::new(WhisperQueue::new());
        let mut handles = Vec::new();

        for producer in 0..4 {
            let queue = queue.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    queue.add(format!("producer{producer}"), format!("msg{i}"));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(queue.len(), 200);
        // Every dequeued whisper is intact (originator matches its text's producer run)
        while let Some(w) = queue.try_dequeue() {
            assert!(w.originator.starts_with("producer"));
            assert!(w.text.starts_with("msg"));
        }
    }

    #[test]
    fn per_producer_order_is_preserved() {
        let queue = Arc::new(WhisperQueue::new());
        for i in 0..10 {
            queue.add("Alice", format!("{i}"));
        }
        let mut last = -1i64;
        while let Some(w) = queue.try_dequeue() {
            let n: i64 = w.text.parse().unwrap();
            assert!(n > last);
            last = n;
        }
    }
}
