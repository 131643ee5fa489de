//! `cobblemind doctor` — diagnose gateway and sidecar health.

use cobblemind_config::AppConfig;
use cobblemind_core::bridge::ContextSource as _;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("CobbleMind Doctor");
    println!();
    println!("  Config:  {}", AppConfig::config_dir().join("config.toml").display());
    println!("  Gateway: {} ({})", config.default_gateway, config.default_model);
    println!(
        "  API key: {}",
        if config.has_api_key() { "present" } else { "MISSING" }
    );

    // Gateway reachability
    match cobblemind_gateways::from_config(&config) {
        Ok(gateway) => match gateway.health_check().await {
            Ok(true) => println!("  Gateway health: ok"),
            Ok(false) => println!("  Gateway health: UNREACHABLE"),
            Err(e) => println!("  Gateway health: FAILED ({e})"),
        },
        Err(e) => println!("  Gateway health: NOT CONFIGURED ({e})"),
    }

    // Sidecar reachability
    print!(
        "  Sidecar {}:{}: ",
        config.bridge.host, config.bridge.port
    );
    match super::wiring::connect_bridge(&config).await {
        Ok(bridge) => match bridge.snapshot().await {
            Ok(blob) => println!("ok (position: {})", blob["position"]),
            Err(e) => println!("connected, snapshot FAILED ({e})"),
        },
        Err(e) => println!("UNREACHABLE ({e})"),
    }

    Ok(())
}
