//! Whisper action — the reply primitive.
//!
//! This is the one `Terminal` action: the driver sends every text reply
//! through it, and a model request naming it ends the conversation.

use async_trait::async_trait;
use cobblemind_core::action::{Action, ActionKind, ActionOutcome};
use cobblemind_core::bridge::GameBridge;
use cobblemind_core::error::ActionError;
use std::sync::Arc;
use tracing::debug;

pub struct WhisperAction {
    bridge: Arc<dyn GameBridge>,
}

impl WhisperAction {
    pub fn new(bridge: Arc<dyn GameBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Action for WhisperAction {
    fn name(&self) -> &str {
        "whisper"
    }

    fn description(&self) -> &str {
        "Send a private whisper to a player"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "username": { "type": "string" },
                "message": { "type": "string" }
            },
            "required": ["username", "message"],
            "additionalProperties": false
        })
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Terminal
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        let username = arguments["username"]
            .as_str()
            .ok_or_else(|| ActionError::InvalidArguments("Missing 'username' argument".into()))?;
        let message = arguments["message"]
            .as_str()
            .ok_or_else(|| ActionError::InvalidArguments("Missing 'message' argument".into()))?;

        debug!(username, "Whispering reply");
        self.bridge.whisper(username, message).await?;

        Ok(ActionOutcome::success(serde_json::json!({
            "whispered_to": username
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBridge;

    #[tokio::test]
    async fn whispers_through_bridge() {
        let bridge = Arc::new(MockBridge::new());
        let action = WhisperAction::new(bridge.clone());

        let outcome = action
            .invoke(serde_json::json!({"username": "Alice", "message": "hello"}))
            .await
            .unwrap();

        assert!(!outcome.is_error());
        assert_eq!(bridge.calls(), vec!["whisper Alice: hello"]);
    }

    #[tokio::test]
    async fn missing_username_is_invalid() {
        let action = WhisperAction::new(Arc::new(MockBridge::new()));
        let result = action.invoke(serde_json::json!({"message": "hi"})).await;
        assert!(matches!(result, Err(ActionError::InvalidArguments(_))));
    }

    #[test]
    fn is_terminal() {
        let action = WhisperAction::new(Arc::new(MockBridge::new()));
        assert_eq!(action.kind(), ActionKind::Terminal);
        assert_eq!(action.schema().name, "whisper");
    }
}
