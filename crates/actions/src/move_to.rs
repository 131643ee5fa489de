//! Move action — walk to an absolute position.
//!
//! Coordinates are absolute; the system prompt instructs the model to resolve
//! relative requests against the current position first. The bridge call
//! resolves when the pathfinder goal is reached, so a long walk occupies the
//! conversation until it completes or the bridge call times out.

use async_trait::async_trait;
use cobblemind_core::action::{Action, ActionOutcome};
use cobblemind_core::bridge::{GameBridge, Position};
use cobblemind_core::error::ActionError;
use std::sync::Arc;
use tracing::debug;

pub struct MoveToAction {
    bridge: Arc<dyn GameBridge>,
}

impl MoveToAction {
    pub fn new(bridge: Arc<dyn GameBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Action for MoveToAction {
    fn name(&self) -> &str {
        "move_to"
    }

    fn description(&self) -> &str {
        "Move the bot to a specific position in the world"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "x": { "type": "number" },
                "y": { "type": "number" },
                "z": { "type": "number" }
            },
            "required": ["x", "y", "z"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        let coord = |key: &str| {
            arguments[key]
                .as_f64()
                .ok_or_else(|| ActionError::InvalidArguments(format!("Missing '{key}' coordinate")))
        };
        let (x, y, z) = (coord("x")?, coord("y")?, coord("z")?);

        debug!(x, y, z, "Walking to position");
        self.bridge.goto(Position { x, y, z }).await?;

        Ok(ActionOutcome::success(serde_json::json!({
            "moved_to": { "x": x, "y": y, "z": z }
        })))
    }
}
