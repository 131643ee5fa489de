//! Transcript and Turn domain types.
//!
//! A transcript is the ordered turn history built and consumed within one
//! conversation: a whisper arrives, the driver seeds a fresh transcript,
//! grows it through gateway calls and action outcomes, and drops it when the
//! conversation ends. Transcripts are never shared across conversations and
//! never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a turn in a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (behavioral rules, game context)
    System,
    /// The originating player
    User,
    /// The model
    Assistant,
    /// An action outcome fed back to the model
    #[serde(rename = "tool")]
    ToolResult,
}

/// An action invocation requested by the model, embedded in an assistant turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionCall {
    /// Unique ID for this call (matches the gateway's tool_call id)
    pub id: String,

    /// Name of the action to invoke
    pub name: String,

    /// Arguments as the raw JSON string the model produced
    pub raw_arguments: String,
}

/// A single turn in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// Who produced this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Action calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_calls: Vec<ActionCall>,

    /// If this is a tool-result turn, which action call it answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_of: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant text turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant turn carrying action calls.
    pub fn assistant_calls(calls: Vec<ActionCall>) -> Self {
        let mut turn = Self::new(Role::Assistant, "");
        turn.action_calls = calls;
        turn
    }

    /// Create a tool-result turn answering `call_id`.
    pub fn action_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut turn = Self::new(Role::ToolResult, content);
        turn.outcome_of = Some(call_id.into());
        turn
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            action_calls: Vec::new(),
            outcome_of: None,
            timestamp: Utc::now(),
        }
    }
}

/// The ordered turn history of one conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    /// Ordered turns
    pub turns: Vec<Turn>,
}

impl Transcript {
    /// Create a new empty transcript.
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Add a turn to the transcript.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The last turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
