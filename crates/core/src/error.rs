//! Error types for the CobbleMind domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all CobbleMind operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Inference gateway errors ---
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    // --- Action errors ---
    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    // --- Game bridge errors ---
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by gateway, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Unrecognized response payload: {0}")]
    InvalidResponse(String),

    #[error("Gateway not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Unknown action: {0}")]
    Unknown(String),

    #[error("Action failed: {action} — {reason}")]
    Failed { action: String, reason: String },

    #[error("Action timed out: {action} after {timeout_secs}s")]
    Timeout { action: String, timeout_secs: u64 },

    #[error("Invalid action arguments: {0}")]
    InvalidArguments(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Bridge not connected: {0}")]
    NotConnected(String),

    #[error("Bridge I/O failed: {0}")]
    Io(String),

    #[error("Bridge protocol violation: {0}")]
    Protocol(String),

    #[error("Bridge call timed out: {op}")]
    Timeout { op: String },

    #[error("Rejected by the game: {0}")]
    Rejected(String),
}
