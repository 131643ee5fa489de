//! # CobbleMind Core
//!
//! Domain types, traits, and error definitions for the CobbleMind Minecraft
//! agent runtime. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here: the inference
//! gateway, the game bridge, and the actions themselves. Implementations live
//! in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod action;
pub mod bridge;
pub mod error;
pub mod event;
pub mod gateway;
pub mod transcript;
pub mod whisper;

// Re-export key types at crate root for ergonomics
pub use action::{Action, ActionKind, ActionOutcome, ActionRegistry, OutcomeStatus};
pub use bridge::{ContextSource, GameBridge, ItemStack, Position};
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use gateway::{ActionSchema, GatewayRequest, InferenceGateway, ResponseUnit};
pub use transcript::{ActionCall, Role, Transcript, Turn};
pub use whisper::{Whisper, WhisperQueue};
