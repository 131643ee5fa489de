//! Shared construction of the runtime from config.

use std::sync::Arc;
use std::time::Duration;

use cobblemind_bridge::TcpBridge;
use cobblemind_config::AppConfig;
use cobblemind_core::event::EventBus;
use cobblemind_driver::ConversationDriver;

/// Load the config, insisting on an API key for gateways that need one.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() && config.default_gateway != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY     = 'sk-...'");
        eprintln!("    OPENROUTER_API_KEY = 'sk-or-v1-...'");
        eprintln!("    COBBLEMIND_API_KEY = 'sk-...'        (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    Ok(config)
}

/// Connect the sidecar bridge configured in `[bridge]`.
pub async fn connect_bridge(config: &AppConfig) -> Result<Arc<TcpBridge>, Box<dyn std::error::Error>> {
    let bridge = TcpBridge::connect(
        &config.bridge.host,
        config.bridge.port,
        Duration::from_secs(config.bridge.call_timeout_secs),
    )
    .await
    .map_err(|e| format!("Failed to reach the game sidecar: {e}"))?;
    Ok(Arc::new(bridge))
}

/// Build the driver over a connected bridge.
pub fn build_driver(
    config: &AppConfig,
    bridge: Arc<TcpBridge>,
    event_bus: Arc<EventBus>,
) -> Result<Arc<ConversationDriver>, Box<dyn std::error::Error>> {
    let gateway = cobblemind_gateways::from_config(config)?;

    let registry = cobblemind_actions::default_registry(bridge.clone())
        .with_invoke_timeout(Duration::from_secs(config.driver.action_timeout_secs));

    let mut driver = ConversationDriver::new(
        gateway,
        Arc::new(registry),
        bridge,
        &config.default_model,
        event_bus,
    )
    .with_max_iterations(config.driver.max_iterations)
    .with_temperature(config.default_temperature);

    if let Some(max_tokens) = config.default_max_tokens {
        driver = driver.with_max_tokens(max_tokens);
    }

    Ok(Arc::new(driver))
}
