//! Configuration loading, validation, and management for CobbleMind.
//!
//! Loads configuration from `~/.cobblemind/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.cobblemind/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-gateway)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default inference gateway
    #[serde(default = "default_gateway")]
    pub default_gateway: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per gateway response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// Conversation driver settings
    #[serde(default)]
    pub driver: DriverConfig,

    /// Game bridge (mineflayer sidecar) settings
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Gateway-specific configurations
    #[serde(default)]
    pub gateways: HashMap<String, GatewayConfig>,
}

fn default_gateway() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_gateway", &self.default_gateway)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("driver", &self.driver)
            .field("bridge", &self.bridge)
            .field("gateways", &self.gateways)
            .finish()
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Conversation driver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Maximum gateway/action iterations per conversation (safety cap)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Backoff between empty queue polls, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-action invocation timeout, in seconds
    #[serde(default = "default_action_timeout_secs")]
    pub action_timeout_secs: u64,
}

fn default_max_iterations() -> u32 {
    10
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_action_timeout_secs() -> u64 {
    30
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            poll_interval_ms: default_poll_interval_ms(),
            action_timeout_secs: default_action_timeout_secs(),
        }
    }
}

/// Game bridge (mineflayer sidecar) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Host the sidecar listens on
    #[serde(default = "default_bridge_host")]
    pub host: String,

    /// Port the sidecar listens on
    #[serde(default = "default_bridge_port")]
    pub port: u16,

    /// Per-call timeout, in seconds (pathfinding can legitimately take a while)
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Bot username, echoed in the snapshot and used by the sidecar at login
    #[serde(default = "default_username")]
    pub username: String,
}

fn default_bridge_host() -> String {
    "127.0.0.1".into()
}
fn default_bridge_port() -> u16 {
    25580
}
fn default_call_timeout_secs() -> u64 {
    60
}
fn default_username() -> String {
    "CobbleMind".into()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: default_bridge_host(),
            port: default_bridge_port(),
            call_timeout_secs: default_call_timeout_secs(),
            username: default_username(),
        }
    }
}

/// Per-gateway overrides.
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.cobblemind/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `COBBLEMIND_API_KEY` (highest priority)
    /// - `OPENROUTER_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("COBBLEMIND_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(gateway) = std::env::var("COBBLEMIND_GATEWAY") {
            config.default_gateway = gateway;
        }

        if let Ok(model) = std::env::var("COBBLEMIND_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cobblemind")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.driver.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "driver.max_iterations must be at least 1".into(),
            ));
        }

        if self.driver.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "driver.poll_interval_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_gateway: default_gateway(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: None,
            driver: DriverConfig::default(),
            bridge: BridgeConfig::default(),
            gateways: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
