//! Shared stubs for driver and processor tests.

use async_trait::async_trait;
use cobblemind_core::action::{Action, ActionKind, ActionOutcome, ActionRegistry};
use cobblemind_core::bridge::ContextSource;
use cobblemind_core::error::{ActionError, BridgeError, GatewayError};
use cobblemind_core::gateway::{GatewayRequest, InferenceGateway, ResponseUnit};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Replies = Arc<Mutex<Vec<(String, String)>>>;
pub type ReceivedArgs = Arc<Mutex<Vec<serde_json::Value>>>;

/// A gateway that plays back scripted batches, or repeats one forever.
pub struct StubGateway {
    batches: Mutex<Vec<Vec<ResponseUnit>>>,
    repeat: Option<Vec<ResponseUnit>>,
    calls: AtomicU32,
    fail: bool,
}

impl StubGateway {
    /// Play back `batches` in order; an exhausted script returns empty lists.
    pub fn scripted(batches: Vec<Vec<ResponseUnit>>) -> Self {
        Self {
            batches: Mutex::new(batches),
            repeat: None,
            calls: AtomicU32::new(0),
            fail: false,
        }
    }

    /// Return the same batch on every call.
    pub fn repeating(batch: Vec<ResponseUnit>) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            repeat: Some(batch),
            calls: AtomicU32::new(0),
            fail: false,
        }
    }

    /// Fail every call with a network error.
    pub fn failing() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            repeat: None,
            calls: AtomicU32::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceGateway for StubGateway {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(
        &self,
        _request: GatewayRequest,
    ) -> Result<Vec<ResponseUnit>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(GatewayError::Network("stub gateway down".into()));
        }
        if let Some(batch) = &self.repeat {
            return Ok(batch.clone());
        }
        let mut batches = self.batches.lock().unwrap();
        if batches.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(batches.remove(0))
        }
    }
}

/// A fixed world snapshot.
#[derive(Default)]
pub struct StubContext;

#[async_trait]
impl ContextSource for StubContext {
    async fn snapshot(&self) -> Result<serde_json::Value, BridgeError> {
        Ok(serde_json::json!({
            "position": {"x": 0, "y": 64, "z": 0},
            "health": 20,
            "food": 20,
            "time": 1000,
            "weather": "clear"
        }))
    }
}

/// The terminal reply action, recording every (username, message) pair.
pub struct RecordingReplyAction {
    replies: Replies,
}

impl RecordingReplyAction {
    /// Register into `registry` and hand back the recording.
    pub fn install(registry: &mut ActionRegistry) -> Replies {
        let replies: Replies = Arc::new(Mutex::new(Vec::new()));
        registry.register(Box::new(Self {
            replies: replies.clone(),
        }));
        replies
    }
}

#[async_trait]
impl Action for RecordingReplyAction {
    fn name(&self) -> &str {
        "whisper"
    }
    fn description(&self) -> &str {
        "Send a private whisper to a player"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }
    fn kind(&self) -> ActionKind {
        ActionKind::Terminal
    }
    async fn invoke(&self, arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        self.replies.lock().unwrap().push((
            arguments["username"].as_str().unwrap_or("").to_string(),
            arguments["message"].as_str().unwrap_or("").to_string(),
        ));
        Ok(ActionOutcome::success(serde_json::json!({"sent": true})))
    }
}

/// A regular action that records the arguments it was invoked with.
pub struct RecordingAction {
    name: &'static str,
    received: ReceivedArgs,
    delay: Option<Duration>,
}

impl RecordingAction {
    /// Register into `registry` under `name` and hand back the recording.
    pub fn install(registry: &mut ActionRegistry, name: &'static str) -> ReceivedArgs {
        Self::install_with_delay(registry, name, None)
    }

    /// Same, but each invocation sleeps for `delay` first.
    pub fn install_with_delay(
        registry: &mut ActionRegistry,
        name: &'static str,
        delay: Option<Duration>,
    ) -> ReceivedArgs {
        let received: ReceivedArgs = Arc::new(Mutex::new(Vec::new()));
        registry.register(Box::new(Self {
            name,
            received: received.clone(),
            delay,
        }));
        received
    }
}

#[async_trait]
impl Action for RecordingAction {
    fn name(&self) -> &str {
        self.name
    }
    fn description(&self) -> &str {
        "Records its arguments"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }
    async fn invoke(&self, arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.received.lock().unwrap().push(arguments);
        Ok(ActionOutcome::success(serde_json::json!({"ok": true})))
    }
}

/// An action that always fails internally.
pub struct FaultyAction;

#[async_trait]
impl Action for FaultyAction {
    fn name(&self) -> &str {
        "faulty"
    }
    fn description(&self) -> &str {
        "Always fails"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }
    async fn invoke(&self, _arguments: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        Err(ActionError::Failed {
            action: "faulty".into(),
            reason: "boom".into(),
        })
    }
}

/// A registry with the recording reply action plus a recording `move_to`.
pub fn registry_with() -> (Arc<ActionRegistry>, Replies, ReceivedArgs) {
    let mut registry = ActionRegistry::new();
    let replies = RecordingReplyAction::install(&mut registry);
    let moves = RecordingAction::install(&mut registry, "move_to");
    (Arc::new(registry), replies, moves)
}
