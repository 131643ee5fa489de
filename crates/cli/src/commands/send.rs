//! `cobblemind send` — drive a single whisper through one conversation.
//!
//! Useful for exercising the gateway and sidecar without waiting for a real
//! in-game whisper.

use std::sync::Arc;

use cobblemind_core::event::EventBus;
use cobblemind_core::whisper::Whisper;

use super::wiring;

pub async fn run(originator: String, text: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = wiring::load_config()?;

    let bridge = wiring::connect_bridge(&config).await?;
    let event_bus = Arc::new(EventBus::default());
    let driver = wiring::build_driver(&config, bridge, event_bus)?;

    eprintln!("  Driving whisper from {originator}...");
    driver.process(Whisper::new(originator, text)).await;
    eprintln!("  Done.");

    Ok(())
}
