//! Game bridge implementation for CobbleMind.
//!
//! The runtime never speaks the Minecraft protocol itself. A mineflayer
//! sidecar owns the world connection, pathfinding, and physics; this crate
//! connects to it over TCP and implements `GameBridge` on top of a JSON-line
//! request/response protocol.

pub mod tcp;

pub use tcp::TcpBridge;
