//! Place action — place a block from the inventory at an offset from the bot.

use async_trait::async_trait;
use cobblemind_core::action::{Action, ActionOutcome};
use cobblemind_core::bridge::GameBridge;
use cobblemind_core::error::ActionError;
use std::sync::Arc;

pub struct PlaceBlockAction {
    bridge: Arc<dyn GameBridge>,
}

impl PlaceBlockAction {
    pub fn new(bridge: Arc<dyn GameBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Action for PlaceBlockAction {
    fn name(&self) -> &str {
        "place_block"
    }

    fn description(&self) -> &str {
        "Place a block at the agent's current position or relative position"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "block_type": {
                    "type": "string",
                    "description": "Type of block to place (e.g., 'stone', 'dirt', 'wood')"
                },
                "x_offset": { "type": "number", "description": "X offset from current position (default 0)" },
                "y_offset": { "type": "number", "description": "Y offset from current position (default 0)" },
                "z_offset": { "type": "number", "description": "Z offset from current position (default 0)" }
            },
            "required": ["block_type"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        let block_type = arguments["block_type"]
            .as_str()
            .ok_or_else(|| ActionError::InvalidArguments("Missing 'block_type' argument".into()))?;

        let offset = |key: &str| arguments[key].as_i64().unwrap_or(0) as i32;
        let (dx, dy, dz) = (offset("x_offset"), offset("y_offset"), offset("z_offset"));

        self.bridge.place(block_type, dx, dy, dz).await?;

        Ok(ActionOutcome::success(serde_json::json!({
            "placed": block_type,
            "offset": { "x": dx, "y": dy, "z": dz }
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBridge;

    #[tokio::test]
    async fn places_through_bridge() {
        let bridge = Arc::new(MockBridge::new());
        let action = PlaceBlockAction::new(bridge.clone());

        let outcome = action
            .invoke(serde_json::json!({"block_type": "stone", "x_offset": 1}))
            .await
            .unwrap();

        assert!(!outcome.is_error());
        // Unspecified offsets default to 0
        assert_eq!(bridge.calls(), vec!["place stone 1 0 0"]);
    }

    #[tokio::test]
    async fn missing_block_in_inventory_surfaces_as_error() {
        let action = PlaceBlockAction::new(Arc::new(MockBridge::failing("no stone in inventory")));
        let result = action.invoke(serde_json::json!({"block_type": "stone"})).await;
        assert!(result.is_err());
    }
}
