//! Inventory action — list current inventory contents.

use async_trait::async_trait;
use cobblemind_core::action::{Action, ActionOutcome};
use cobblemind_core::bridge::GameBridge;
use cobblemind_core::error::ActionError;
use std::sync::Arc;

pub struct GetInventoryAction {
    bridge: Arc<dyn GameBridge>,
}

impl GetInventoryAction {
    pub fn new(bridge: Arc<dyn GameBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Action for GetInventoryAction {
    fn name(&self) -> &str {
        "get_inventory"
    }

    fn description(&self) -> &str {
        "Get the current inventory items and quantities"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    async fn invoke(&self, _arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        let items = self.bridge.inventory().await?;

        Ok(ActionOutcome::success(serde_json::json!({
            "items": items
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBridge;

    #[tokio::test]
    async fn lists_inventory() {
        let bridge = Arc::new(MockBridge::new());
        let action = GetInventoryAction::new(bridge.clone());

        let outcome = action.invoke(serde_json::json!({})).await.unwrap();

        assert!(!outcome.is_error());
        let items = outcome.payload["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "cobblestone");
        assert_eq!(bridge.calls(), vec!["inventory"]);
    }

    #[test]
    fn takes_no_parameters() {
        let action = GetInventoryAction::new(Arc::new(MockBridge::new()));
        let schema = action.parameters_schema();
        assert!(schema["properties"].as_object().unwrap().is_empty());
    }
}
