//! Craft action — craft an item from available materials.

use async_trait::async_trait;
use cobblemind_core::action::{Action, ActionOutcome};
use cobblemind_core::bridge::GameBridge;
use cobblemind_core::error::ActionError;
use std::sync::Arc;

pub struct CraftItemAction {
    bridge: Arc<dyn GameBridge>,
}

impl CraftItemAction {
    pub fn new(bridge: Arc<dyn GameBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Action for CraftItemAction {
    fn name(&self) -> &str {
        "craft_item"
    }

    fn description(&self) -> &str {
        "Craft an item using available materials"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "item": {
                    "type": "string",
                    "description": "Item to craft (e.g., 'wooden_pickaxe', 'torch', 'chest')"
                },
                "quantity": {
                    "type": "number",
                    "description": "Number of items to craft (default 1)"
                }
            },
            "required": ["item"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        let item = arguments["item"]
            .as_str()
            .ok_or_else(|| ActionError::InvalidArguments("Missing 'item' argument".into()))?;
        let quantity = arguments["quantity"].as_u64().unwrap_or(1) as u32;

        self.bridge.craft(item, quantity).await?;

        Ok(ActionOutcome::success(serde_json::json!({
            "crafted": item,
            "quantity": quantity
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBridge;

    #[tokio::test]
    async fn crafts_through_bridge() {
        let bridge = Arc::new(MockBridge::new());
        let action = CraftItemAction::new(bridge.clone());

        let outcome = action
            .invoke(serde_json::json!({"item": "torch", "quantity": 4}))
            .await
            .unwrap();

        assert!(!outcome.is_error());
        assert_eq!(bridge.calls(), vec!["craft 4 torch"]);
    }

    #[tokio::test]
    async fn quantity_defaults_to_one() {
        let bridge = Arc::new(MockBridge::new());
        let action = CraftItemAction::new(bridge.clone());

        action.invoke(serde_json::json!({"item": "chest"})).await.unwrap();
        assert_eq!(bridge.calls(), vec!["craft 1 chest"]);
    }

    #[tokio::test]
    async fn no_recipe_surfaces_as_error() {
        let action = CraftItemAction::new(Arc::new(MockBridge::failing("no recipes found")));
        let result = action.invoke(serde_json::json!({"item": "bedrock"})).await;
        assert!(result.is_err());
    }
}
