//! Look-around action — scan nearby blocks and entities.

use async_trait::async_trait;
use cobblemind_core::action::{Action, ActionOutcome};
use cobblemind_core::bridge::GameBridge;
use cobblemind_core::error::ActionError;
use std::sync::Arc;

const DEFAULT_RADIUS: u32 = 5;

pub struct LookAroundAction {
    bridge: Arc<dyn GameBridge>,
}

impl LookAroundAction {
    pub fn new(bridge: Arc<dyn GameBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Action for LookAroundAction {
    fn name(&self) -> &str {
        "look_around"
    }

    fn description(&self) -> &str {
        "Get information about blocks and entities in the surrounding area"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "radius": {
                    "type": "number",
                    "description": "Radius to scan around the agent (default 5)"
                }
            },
            "required": [],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        let radius = arguments["radius"].as_u64().unwrap_or(DEFAULT_RADIUS as u64) as u32;

        let scan = self.bridge.surroundings(radius).await?;

        Ok(ActionOutcome::success(scan))
    }
}
