//! OpenAI-compatible gateway implementation.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, and any endpoint exposing
//! `/v1/chat/completions` with function calling.
//!
//! The single choice message is flattened into the driver's unit list:
//! non-empty content becomes a `TextReply`, then each tool call becomes an
//! `ActionRequest`, preserving the order the API reports them in.

use async_trait::async_trait;
use cobblemind_core::error::GatewayError;
use cobblemind_core::gateway::{ActionSchema, GatewayRequest, InferenceGateway, ResponseUnit};
use cobblemind_core::transcript::{Role, Turn};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An OpenAI-compatible inference gateway.
pub struct OpenAiCompatGateway {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatGateway {
    /// Create a new OpenAI-compatible gateway.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an OpenAI gateway (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Create an OpenRouter gateway (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key)
    }

    /// Create an Ollama gateway (convenience constructor).
    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
        )
    }

    /// Convert transcript turns to OpenAI API format.
    fn to_api_messages(turns: &[Turn]) -> Vec<ApiMessage> {
        turns
            .iter()
            .map(|t| ApiMessage {
                role: match t.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                    Role::ToolResult => "tool".into(),
                },
                content: Some(t.content.clone()),
                tool_calls: if t.action_calls.is_empty() {
                    None
                } else {
                    Some(
                        t.action_calls
                            .iter()
                            .map(|c| ApiToolCall {
                                id: c.id.clone(),
                                r#type: "function".into(),
                                function: ApiFunction {
                                    name: c.name.clone(),
                                    arguments: c.raw_arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: t.outcome_of.clone(),
            })
            .collect()
    }

    /// Convert action schemas to OpenAI API format.
    fn to_api_tools(actions: &[ActionSchema]) -> Vec<ApiToolDefinition> {
        actions
            .iter()
            .map(|a| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: a.name.clone(),
                    description: a.description.clone(),
                    parameters: a.parameters.clone(),
                },
            })
            .collect()
    }

    /// Flatten one choice message into ordered response units.
    fn to_units(message: ApiMessage) -> Vec<ResponseUnit> {
        let mut units = Vec::new();

        if let Some(content) = message.content
            && !content.trim().is_empty()
        {
            units.push(ResponseUnit::TextReply { text: content });
        }

        for tc in message.tool_calls.unwrap_or_default() {
            units.push(ResponseUnit::ActionRequest {
                id: tc.id,
                name: tc.function.name,
                raw_arguments: tc.function.arguments,
            });
        }

        units
    }
}

#[async_trait]
impl InferenceGateway for OpenAiCompatGateway {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: GatewayRequest,
    ) -> std::result::Result<Vec<ResponseUnit>, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.turns),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.actions.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.actions));
            body["tool_choice"] = serde_json::json!("auto");
        }

        debug!(gateway = %self.name, model = %request.model, turns = request.turns.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(e.to_string())
                } else {
                    GatewayError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GatewayError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(GatewayError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gateway returned error");
            return Err(GatewayError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::InvalidResponse("No choices in response".into()))?;

        Ok(Self::to_units(choice.message))
    }

    async fn health_check(&self) -> std::result::Result<bool, GatewayError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}
