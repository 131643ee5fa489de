//! `cobblemind run` — connect to the sidecar and process whispers until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use cobblemind_core::event::{DomainEvent, EventBus};
use cobblemind_core::whisper::WhisperQueue;
use cobblemind_driver::WhisperProcessor;
use tracing::{info, warn};

use super::wiring;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = wiring::load_config()?;

    println!("CobbleMind — whisper runtime");
    println!("   Gateway: {} ({})", config.default_gateway, config.default_model);
    println!("   Sidecar: {}:{}", config.bridge.host, config.bridge.port);
    println!("   Bot:     {}", config.bridge.username);

    let bridge = wiring::connect_bridge(&config).await?;
    let event_bus = Arc::new(EventBus::default());
    let driver = wiring::build_driver(&config, bridge.clone(), event_bus.clone())?;

    let queue = Arc::new(WhisperQueue::new());
    let processor = WhisperProcessor::new(queue.clone(), driver)
        .with_poll_interval(Duration::from_millis(config.driver.poll_interval_ms));

    // Surface conversation lifecycle at info level
    let mut events = event_bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event.as_ref() {
                DomainEvent::ReplySent { originator, .. } => {
                    info!(originator = %originator, "Reply sent");
                }
                DomainEvent::ConversationEnded {
                    originator,
                    iterations,
                    completed,
                    ..
                } => {
                    if *completed {
                        info!(originator = %originator, iterations, "Conversation ended");
                    } else {
                        warn!(originator = %originator, iterations, "Conversation hit the iteration cap");
                    }
                }
                _ => {}
            }
        }
    });

    // Feed inbound whisper events from the sidecar into the queue
    let feed = tokio::spawn(feed_whispers(bridge, queue));

    processor.start();
    info!("Processing whispers; Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Stop requested; draining in-flight conversation");
    feed.abort();
    processor.stop().await;

    Ok(())
}

/// Poll the sidecar for buffered whisper events.
///
/// The sidecar queues whisper events it observes; `poll_whispers` drains
/// them. This stays outside the core loop — it is just the transport feeding
/// `WhisperQueue::add`.
async fn feed_whispers(bridge: Arc<cobblemind_bridge::TcpBridge>, queue: Arc<WhisperQueue>) {
    loop {
        match bridge.poll_whispers().await {
            Ok(events) => {
                for (originator, text) in events {
                    queue.add(originator, text);
                }
            }
            Err(e) => {
                warn!(error = %e, "Whisper poll failed; retrying");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
