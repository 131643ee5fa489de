//! InferenceGateway trait — the abstraction over LLM backends.
//!
//! A gateway accepts an ordered transcript plus the declared action schemas
//! and returns an ordered list of response units, each either plain text or a
//! request to invoke one named action. The conversation driver consumes the
//! units without knowing which backend produced them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::transcript::Turn;

/// A request to the inference gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// The model to use (e.g., "gpt-4o-mini")
    pub model: String,

    /// The full conversation transcript so far
    pub turns: Vec<Turn>,

    /// Available actions the model can request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionSchema>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A declared action schema sent to the model so it knows what it can call.
///
/// Built once from the registry at startup and passed through unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSchema {
    /// The action name
    pub name: String,

    /// Description of what the action does
    pub description: String,

    /// JSON Schema describing the action's parameters
    pub parameters: serde_json::Value,
}

/// One unit of a gateway response, consumed in order by the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseUnit {
    /// A plain text message to relay to the originator
    TextReply { text: String },

    /// A request to invoke one named action
    ActionRequest {
        /// Call ID (echoed back in the tool-result turn)
        id: String,
        /// Name of the action
        name: String,
        /// Arguments as the raw JSON string the model produced
        raw_arguments: String,
    },
}

impl ResponseUnit {
    pub fn is_text(&self) -> bool {
        matches!(self, ResponseUnit::TextReply { .. })
    }

    /// The requested action name, if this is an action request.
    pub fn action_name(&self) -> Option<&str> {
        match self {
            ResponseUnit::ActionRequest { name, .. } => Some(name),
            ResponseUnit::TextReply { .. } => None,
        }
    }
}

/// The core InferenceGateway trait.
///
/// Every LLM backend implements this. The driver calls `complete()` without
/// knowing which gateway is configured — pure polymorphism.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// A human-readable name for this gateway (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Send the transcript and get back an ordered list of response units.
    async fn complete(
        &self,
        request: GatewayRequest,
    ) -> std::result::Result<Vec<ResponseUnit>, GatewayError>;

    /// Health check — can we reach the gateway?
    async fn health_check(&self) -> std::result::Result<bool, GatewayError> {
        Ok(true)
    }
}
