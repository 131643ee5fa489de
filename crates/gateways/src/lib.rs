//! Inference gateway implementations for CobbleMind.
//!
//! All gateways implement the `cobblemind_core::InferenceGateway` trait.
//! `from_config` selects and constructs the right one at startup.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatGateway;

use std::sync::Arc;

use cobblemind_config::AppConfig;
use cobblemind_core::InferenceGateway;
use cobblemind_core::error::GatewayError;

/// Build the configured inference gateway.
///
/// `default_gateway` selects among the known constructors; an unknown name is
/// treated as a custom OpenAI-compatible endpoint and requires an `api_url`
/// in its `[gateways.<name>]` section.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn InferenceGateway>, GatewayError> {
    let name = config.default_gateway.as_str();
    let overrides = config.gateways.get(name);

    let api_key = overrides
        .and_then(|g| g.api_key.clone())
        .or_else(|| config.api_key.clone());

    let gateway = match name {
        "openai" => OpenAiCompatGateway::openai(require_key(name, api_key)?),
        "openrouter" => OpenAiCompatGateway::openrouter(require_key(name, api_key)?),
        "ollama" => {
            OpenAiCompatGateway::ollama(overrides.and_then(|g| g.api_url.as_deref()))
        }
        custom => {
            let url = overrides.and_then(|g| g.api_url.clone()).ok_or_else(|| {
                GatewayError::NotConfigured(format!(
                    "gateway '{custom}' needs an api_url in [gateways.{custom}]"
                ))
            })?;
            OpenAiCompatGateway::new(custom, url, api_key.unwrap_or_default())
        }
    };

    Ok(Arc::new(gateway))
}

fn require_key(name: &str, key: Option<String>) -> Result<String, GatewayError> {
    key.ok_or_else(|| GatewayError::NotConfigured(format!("gateway '{name}' needs an API key")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_requires_key() {
        let config = AppConfig::default();
        assert!(matches!(
            from_config(&config),
            Err(GatewayError::NotConfigured(_))
        ));
    }

    #[test]
    fn openai_with_key() {
        let config = AppConfig {
            api_key: Some("sk-test".into()),
            ..AppConfig::default()
        };
        let gateway = from_config(&config).unwrap();
        assert_eq!(gateway.name(), "openai");
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = AppConfig {
            default_gateway: "ollama".into(),
            ..AppConfig::default()
        };
        let gateway = from_config(&config).unwrap();
        assert_eq!(gateway.name(), "ollama");
    }

    #[test]
    fn custom_gateway_requires_url() {
        let config = AppConfig {
            default_gateway: "vllm".into(),
            ..AppConfig::default()
        };
        assert!(matches!(
            from_config(&config),
            Err(GatewayError::NotConfigured(_))
        ));
    }
}
