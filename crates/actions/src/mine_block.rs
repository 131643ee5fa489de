//! Mine action — break a block at an offset from the bot.

use async_trait::async_trait;
use cobblemind_core::action::{Action, ActionOutcome};
use cobblemind_core::bridge::GameBridge;
use cobblemind_core::error::ActionError;
use std::sync::Arc;

pub struct MineBlockAction {
    bridge: Arc<dyn GameBridge>,
}

impl MineBlockAction {
    pub fn new(bridge: Arc<dyn GameBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Action for MineBlockAction {
    fn name(&self) -> &str {
        "mine_block"
    }

    fn description(&self) -> &str {
        "Mine/break a block at the specified relative position"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "x_offset": { "type": "number", "description": "X offset from current position" },
                "y_offset": { "type": "number", "description": "Y offset from current position" },
                "z_offset": { "type": "number", "description": "Z offset from current position" }
            },
            "required": ["x_offset", "y_offset", "z_offset"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        let offset = |key: &str| {
            arguments[key]
                .as_i64()
                .ok_or_else(|| ActionError::InvalidArguments(format!("Missing '{key}'")))
                .map(|v| v as i32)
        };
        let (dx, dy, dz) = (offset("x_offset")?, offset("y_offset")?, offset("z_offset")?);

        let block = self.bridge.dig(dx, dy, dz).await?;

        Ok(ActionOutcome::success(serde_json::json!({
            "mined": block,
            "offset": { "x": dx, "y": dy, "z": dz }
        })))
    }
}
