//! The whisper processing loop — drains the queue, one conversation at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cobblemind_core::whisper::WhisperQueue;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::driver::ConversationDriver;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The long-lived consumer: dequeues whispers in FIFO order and hands each to
/// the driver, never running two conversations concurrently.
///
/// A slow or stuck conversation delays all subsequent whispers — deliberate
/// single-consumer backpressure; simplicity over throughput.
pub struct WhisperProcessor {
    queue: Arc<WhisperQueue>,
    driver: Arc<ConversationDriver>,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl WhisperProcessor {
    pub fn new(queue: Arc<WhisperQueue>, driver: Arc<ConversationDriver>) -> Self {
        Self {
            queue,
            driver,
            poll_interval: DEFAULT_POLL_INTERVAL,
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    /// Set the backoff between empty queue polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The queue this processor drains; producers enqueue through it.
    pub fn queue(&self) -> Arc<WhisperQueue> {
        self.queue.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the consumer task. Idempotent: returns `false` when already
    /// running.
    pub fn start(&self) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Whisper processor already running");
            return false;
        }

        let queue = self.queue.clone();
        let driver = self.driver.clone();
        let running = self.running.clone();
        let interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            info!("Whisper processor started");
            while running.load(Ordering::SeqCst) {
                match queue.try_dequeue() {
                    Some(whisper) => driver.process(whisper).await,
                    None => tokio::time::sleep(interval).await,
                }
            }
            info!("Whisper processor stopped");
        });

        *lock_handle(&self.handle) = Some(handle);
        true
    }

    /// Stop the consumer task, letting an in-flight conversation finish.
    /// Idempotent: returns `false` when not running.
    pub async fn stop(&self) -> bool {
        if !self.running.swap(false, Ordering::SeqCst) {
            debug!("Whisper processor not running");
            return false;
        }

        let handle = lock_handle(&self.handle).take();
        if let Some(handle) = handle {
            // The task only observes the flag between conversations, so this
            // join is the graceful drain.
            let _ = handle.await;
        }
        true
    }
}

fn lock_handle(
    handle: &Mutex<Option<JoinHandle<()>>>,
) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
    handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
