//! GameBridge trait — the abstraction over the acting backend.
//!
//! The runtime does not speak the Minecraft protocol itself: a mineflayer
//! sidecar owns the world connection, pathfinding, and physics. The bridge
//! exposes the verbs the built-in actions need, plus a world-context snapshot
//! accessor for seeding conversations. Implementations live in the `bridge`
//! crate; tests use in-crate mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// A position in the world, absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One inventory stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStack {
    pub name: String,
    pub count: u32,
    pub slot: u32,
}

/// Accessor for the current world/game context.
///
/// The snapshot is an opaque JSON blob (position, health, food, time-of-day,
/// weather) — the driver serializes it into a system turn without modeling it
/// further.
#[async_trait]
pub trait ContextSource: Send + Sync {
    async fn snapshot(&self) -> std::result::Result<serde_json::Value, BridgeError>;
}

/// The game verbs the built-in actions are written against.
///
/// Calls that wait on the world (pathfinding, digging) resolve when the
/// sidecar reports completion; implementations must convert a hang into a
/// `BridgeError::Timeout` rather than awaiting forever.
#[async_trait]
pub trait GameBridge: ContextSource {
    /// Send a private whisper to a player.
    async fn whisper(&self, username: &str, message: &str)
        -> std::result::Result<(), BridgeError>;

    /// Send a message to the global chat.
    async fn chat(&self, message: &str) -> std::result::Result<(), BridgeError>;

    /// Walk to an absolute position; resolves when the goal is reached.
    async fn goto(&self, target: Position) -> std::result::Result<(), BridgeError>;

    /// Break the block at the given offset from the bot. Returns the block name.
    async fn dig(&self, dx: i32, dy: i32, dz: i32) -> std::result::Result<String, BridgeError>;

    /// Place a block of `block_type` at the given offset from the bot.
    async fn place(
        &self,
        block_type: &str,
        dx: i32,
        dy: i32,
        dz: i32,
    ) -> std::result::Result<(), BridgeError>;

    /// Current inventory contents.
    async fn inventory(&self) -> std::result::Result<Vec<ItemStack>, BridgeError>;

    /// Blocks and entities within `radius` of the bot, as an opaque blob.
    async fn surroundings(
        &self,
        radius: u32,
    ) -> std::result::Result<serde_json::Value, BridgeError>;

    /// Craft `quantity` of `item` from available materials.
    async fn craft(&self, item: &str, quantity: u32) -> std::result::Result<(), BridgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_serialization() {
        let pos = Position {
            x: 12.0,
            y: 64.0,
            z: -7.5,
        };
        let json = serde_json::to_string(&pos).unwrap();
        let parsed: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pos);
    }

    #[test]
    fn item_stack_serialization() {
        let stack = ItemStack {
            name: "cobblestone".into(),
            count: 64,
            slot: 36,
        };
        let json = serde_json::to_string(&stack).unwrap();
        assert!(json.contains("cobblestone"));
        assert!(json.contains("64"));
    }
}
