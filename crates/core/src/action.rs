//! Action trait — the abstraction over game capabilities.
//!
//! Actions are what give the model the ability to act in the world: move
//! around, mine and place blocks, check the inventory, whisper back to the
//! player. Actions are registered in the ActionRegistry and declared to the
//! gateway as schemas.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::ActionError;
use crate::gateway::ActionSchema;

/// How the driver treats an action with respect to conversation lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// An ordinary game action; the conversation continues after it.
    Regular,
    /// The reply action; requesting it ends the conversation.
    Terminal,
}

/// Whether an action invocation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// The result of one action invocation.
///
/// Every action request yields exactly one outcome — unknown names,
/// invocation failures, and timeouts are all folded into an `Error` outcome
/// rather than propagated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Whether the invocation succeeded
    pub status: OutcomeStatus,

    /// Structured result on success, error message on failure
    pub payload: serde_json::Value,
}

impl ActionOutcome {
    /// A successful outcome carrying a structured payload.
    pub fn success(payload: serde_json::Value) -> Self {
        Self {
            status: OutcomeStatus::Success,
            payload,
        }
    }

    /// An error outcome carrying a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            payload: serde_json::Value::String(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == OutcomeStatus::Error
    }

    /// Serialize for feeding back into the transcript.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"status":"error"}"#.into())
    }
}

/// The core Action trait.
///
/// Each game capability (whisper, move_to, mine_block, etc.) implements this
/// trait. Actions are registered in the ActionRegistry and made available to
/// the conversation driver.
#[async_trait]
pub trait Action: Send + Sync {
    /// The unique name of this action (e.g., "move_to").
    fn name(&self) -> &str;

    /// A description of what this action does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this action's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Whether requesting this action ends the conversation.
    fn kind(&self) -> ActionKind {
        ActionKind::Regular
    }

    /// Invoke the action with the given arguments.
    async fn invoke(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ActionOutcome, ActionError>;

    /// Convert this action into a schema for declaring to the gateway.
    fn schema(&self) -> ActionSchema {
        ActionSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

const DEFAULT_INVOKE_TIMEOUT: Duration = Duration::from_secs(30);

/// A registry of available actions.
///
/// The driver uses this to:
/// 1. Get action schemas to declare to the gateway
/// 2. Invoke actions when the model requests them
///
/// `invoke` is total: every request yields an outcome, never an error or a
/// panic. A per-invocation timeout converts a hung action into an error
/// outcome so one stuck call cannot stall the single-consumer loop forever.
pub struct ActionRegistry {
    actions: HashMap<String, Box<dyn Action>>,
    /// Registration order, so `terminal_action` has a deterministic answer.
    order: Vec<String>,
    invoke_timeout: Duration,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            order: Vec::new(),
            invoke_timeout: DEFAULT_INVOKE_TIMEOUT,
        }
    }

    /// Set the per-invocation timeout.
    pub fn with_invoke_timeout(mut self, timeout: Duration) -> Self {
        self.invoke_timeout = timeout;
        self
    }

    /// Register an action. Replaces any existing action with the same name.
    pub fn register(&mut self, action: Box<dyn Action>) {
        let name = action.name().to_string();
        if self.actions.insert(name.clone(), action).is_none() {
            self.order.push(name);
        }
    }

    /// Get an action by name.
    pub fn get(&self, name: &str) -> Option<&dyn Action> {
        self.actions.get(name).map(|a| a.as_ref())
    }

    /// All declared action schemas, in registration order.
    pub fn schemas(&self) -> Vec<ActionSchema> {
        self.order
            .iter()
            .filter_map(|name| self.actions.get(name))
            .map(|a| a.schema())
            .collect()
    }

    /// The name of the designated reply action: the first registered
    /// `Terminal` entry.
    pub fn terminal_action(&self) -> Option<&str> {
        self.order
            .iter()
            .find(|name| {
                self.actions
                    .get(name.as_str())
                    .is_some_and(|a| a.kind() == ActionKind::Terminal)
            })
            .map(|s| s.as_str())
    }

    /// Whether `name` is a registered terminal action.
    pub fn is_terminal(&self, name: &str) -> bool {
        self.actions
            .get(name)
            .is_some_and(|a| a.kind() == ActionKind::Terminal)
    }

    /// Invoke an action by name. Total: always yields exactly one outcome.
    pub async fn invoke(&self, name: &str, arguments: serde_json::Value) -> ActionOutcome {
        let Some(action) = self.actions.get(name) else {
            return ActionOutcome::error(format!("unknown action: {name}"));
        };

        match tokio::time::timeout(self.invoke_timeout, action.invoke(arguments)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => ActionOutcome::error(e.to_string()),
            Err(_) => ActionOutcome::error(
                ActionError::Timeout {
                    action: name.to_string(),
                    timeout_secs: self.invoke_timeout.as_secs(),
                }
                .to_string(),
            ),
        }
    }

    /// List all registered action names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
