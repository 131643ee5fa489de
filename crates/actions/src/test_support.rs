//! Shared mock bridge for action unit tests.

use async_trait::async_trait;
use cobblemind_core::bridge::{ContextSource, GameBridge, ItemStack, Position};
use cobblemind_core::error::BridgeError;
use std::sync::Mutex;

/// Records every bridge call; optionally fails everything.
pub struct MockBridge {
    pub calls: Mutex<Vec<String>>,
    fail_with: Option<String>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    /// A bridge whose every call is rejected with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), BridgeError> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(reason) => Err(BridgeError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContextSource for MockBridge {
    async fn snapshot(&self) -> Result<serde_json::Value, BridgeError> {
        self.record("snapshot".into())?;
        Ok(serde_json::json!({
            "position": {"x": 0, "y": 64, "z": 0},
            "health": 20,
            "food": 20,
            "time": 1000,
            "weather": "clear"
        }))
    }
}

#[async_trait]
impl GameBridge for MockBridge {
    async fn whisper(&self, username: &str, message: &str) -> Result<(), BridgeError> {
        self.record(format!("whisper {username}: {message}"))
    }

    async fn chat(&self, message: &str) -> Result<(), BridgeError> {
        self.record(format!("chat: {message}"))
    }

    async fn goto(&self, target: Position) -> Result<(), BridgeError> {
        self.record(format!("goto {} {} {}", target.x, target.y, target.z))
    }

    async fn dig(&self, dx: i32, dy: i32, dz: i32) -> Result<String, BridgeError> {
        self.record(format!("dig {dx} {dy} {dz}"))?;
        Ok("stone".into())
    }

    async fn place(
        &self,
        block_type: &str,
        dx: i32,
        dy: i32,
        dz: i32,
    ) -> Result<(), BridgeError> {
        self.record(format!("place {block_type} {dx} {dy} {dz}"))
    }

    async fn inventory(&self) -> Result<Vec<ItemStack>, BridgeError> {
        self.record("inventory".into())?;
        Ok(vec![
            ItemStack {
                name: "cobblestone".into(),
                count: 64,
                slot: 36,
            },
            ItemStack {
                name: "bread".into(),
                count: 3,
                slot: 37,
            },
        ])
    }

    async fn surroundings(&self, radius: u32) -> Result<serde_json::Value, BridgeError> {
        self.record(format!("surroundings {radius}"))?;
        Ok(serde_json::json!({
            "blocks": [{"name": "grass_block", "position": {"x": 0, "y": -1, "z": 0}}],
            "entities": []
        }))
    }

    async fn craft(&self, item: &str, quantity: u32) -> Result<(), BridgeError> {
        self.record(format!("craft {quantity} {item}"))
    }
}
