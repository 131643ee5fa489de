//! Chat action — global chat messages.

use async_trait::async_trait;
use cobblemind_core::action::{Action, ActionOutcome};
use cobblemind_core::bridge::GameBridge;
use cobblemind_core::error::ActionError;
use std::sync::Arc;

pub struct ChatAction {
    bridge: Arc<dyn GameBridge>,
}

impl ChatAction {
    pub fn new(bridge: Arc<dyn GameBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Action for ChatAction {
    fn name(&self) -> &str {
        "chat"
    }

    fn description(&self) -> &str {
        "Send a message to the global chat"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" }
            },
            "required": ["message"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        let message = arguments["message"]
            .as_str()
            .ok_or_else(|| ActionError::InvalidArguments("Missing 'message' argument".into()))?;

        self.bridge.chat(message).await?;

        Ok(ActionOutcome::success(serde_json::json!({ "sent": true })))
    }
}
