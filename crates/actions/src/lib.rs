//! Built-in game actions for CobbleMind.
//!
//! Actions give the model the ability to act in the world: whisper and chat,
//! walk to coordinates, mine and place blocks, check the inventory, scan the
//! surroundings, craft items. Every action is written against the
//! `GameBridge` trait, so the same registry works over any acting backend.

pub mod chat;
pub mod craft;
pub mod inventory;
pub mod look_around;
pub mod mine_block;
pub mod move_to;
pub mod place_block;
pub mod whisper;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use cobblemind_core::bridge::GameBridge;
use cobblemind_core::ActionRegistry;

/// Create the default action registry over the given bridge.
///
/// `whisper` is registered first and tagged `Terminal` — it is the designated
/// reply action the driver treats as conversation-ending.
pub fn default_registry(bridge: Arc<dyn GameBridge>) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register(Box::new(whisper::WhisperAction::new(bridge.clone())));
    registry.register(Box::new(chat::ChatAction::new(bridge.clone())));
    registry.register(Box::new(move_to::MoveToAction::new(bridge.clone())));
    registry.register(Box::new(mine_block::MineBlockAction::new(bridge.clone())));
    registry.register(Box::new(place_block::PlaceBlockAction::new(bridge.clone())));
    registry.register(Box::new(inventory::GetInventoryAction::new(bridge.clone())));
    registry.register(Box::new(look_around::LookAroundAction::new(bridge.clone())));
    registry.register(Box::new(craft::CraftItemAction::new(bridge)));
    registry
}
