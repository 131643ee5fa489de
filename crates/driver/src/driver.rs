//! The conversation driver — one whisper in, a bounded decision cycle out.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use cobblemind_core::action::ActionRegistry;
use cobblemind_core::bridge::ContextSource;
use cobblemind_core::error::Error;
use cobblemind_core::event::{DomainEvent, EventBus};
use cobblemind_core::gateway::{GatewayRequest, InferenceGateway, ResponseUnit};
use cobblemind_core::transcript::{ActionCall, Transcript, Turn};
use cobblemind_core::whisper::Whisper;
use tracing::{debug, info, warn};

/// Fixed behavioral instructions seeding every conversation.
const SYSTEM_INSTRUCTIONS: &str = concat!(
    "You are a Minecraft bot assistant. You can perform actions in the world ",
    "using the declared functions. When a player asks you to do something, use ",
    "the appropriate actions to accomplish their request. If they're just ",
    "talking, respond normally. ",
    "Always give absolute coordinate values for arguments; if you need ",
    "relative ones, first query the current absolute coordinates and then ",
    "calculate from them. ",
    "If the task is large or long-running, prefer delegating subtasks to ",
    "specialized agents. ",
    "Never use markdown formatting in your responses. ",
    "Always use the whisper action to send messages to the player.",
);

const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// What one conversation amounted to.
#[derive(Debug)]
pub struct ConversationSummary {
    /// The full transcript the conversation built
    pub transcript: Transcript,

    /// How many gateway round trips ran
    pub iterations: u32,

    /// False when the iteration cap tripped
    pub completed: bool,
}

/// Drives one conversation per whisper: seed transcript, call the gateway,
/// execute requested actions, repeat until a termination condition or the
/// iteration cap.
///
/// All collaborators are injected; the driver holds no globals.
pub struct ConversationDriver {
    gateway: Arc<dyn InferenceGateway>,
    registry: Arc<ActionRegistry>,
    context: Arc<dyn ContextSource>,
    event_bus: Arc<EventBus>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_iterations: u32,
}

impl ConversationDriver {
    pub fn new(
        gateway: Arc<dyn InferenceGateway>,
        registry: Arc<ActionRegistry>,
        context: Arc<dyn ContextSource>,
        model: impl Into<String>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            gateway,
            registry,
            context,
            event_bus,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the iteration cap (safety valve against runaway action loops).
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Process one whisper end to end.
    ///
    /// All effects are visible only through the reply action and the other
    /// action side effects. Never panics, never propagates: any failure ends
    /// this conversation and is surfaced through logs and events only.
    pub async fn process(&self, whisper: Whisper) {
        info!(originator = %whisper.originator, "Processing whisper");
        self.event_bus.publish(DomainEvent::WhisperReceived {
            originator: whisper.originator.clone(),
            text_preview: whisper.text.chars().take(80).collect(),
            timestamp: Utc::now(),
        });

        let (iterations, completed) = match self.run_conversation(&whisper).await {
            Ok(summary) => {
                debug!(
                    originator = %whisper.originator,
                    iterations = summary.iterations,
                    turns = summary.transcript.len(),
                    completed = summary.completed,
                    "Conversation finished"
                );
                (summary.iterations, summary.completed)
            }
            Err(e) => {
                warn!(originator = %whisper.originator, error = %e, "Conversation failed");
                (0, false)
            }
        };

        self.event_bus.publish(DomainEvent::ConversationEnded {
            originator: whisper.originator,
            iterations,
            completed,
            timestamp: Utc::now(),
        });
    }

    /// The decision cycle. Fallible internals of `process`.
    pub(crate) async fn run_conversation(
        &self,
        whisper: &Whisper,
    ) -> Result<ConversationSummary, Error> {
        let mut transcript = self.seed_transcript(whisper).await;
        let schemas = self.registry.schemas();
        let mut iterations = 0u32;

        while iterations < self.max_iterations {
            let request = GatewayRequest {
                model: self.model.clone(),
                turns: transcript.turns.clone(),
                actions: schemas.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            let units = self.gateway.complete(request).await?;
            if units.is_empty() {
                debug!("Gateway returned no units; ending conversation");
                return Ok(ConversationSummary {
                    transcript,
                    iterations,
                    completed: true,
                });
            }

            for unit in &units {
                match unit {
                    ResponseUnit::TextReply { text } => {
                        self.send_reply(&whisper.originator, text, &mut transcript).await;
                    }
                    ResponseUnit::ActionRequest {
                        id,
                        name,
                        raw_arguments,
                    } => {
                        self.handle_action_request(id, name, raw_arguments, &mut transcript)
                            .await;
                    }
                }
            }

            if self.batch_terminates(&units) {
                return Ok(ConversationSummary {
                    transcript,
                    iterations,
                    completed: true,
                });
            }

            iterations += 1;
        }

        debug!(
            originator = %whisper.originator,
            cap = self.max_iterations,
            "Iteration cap reached; stopping silently"
        );
        Ok(ConversationSummary {
            transcript,
            iterations,
            completed: false,
        })
    }

    /// Seed a fresh transcript: rules, the whisper, a world snapshot.
    async fn seed_transcript(&self, whisper: &Whisper) -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(Turn::system(SYSTEM_INSTRUCTIONS));
        transcript.push(Turn::user(format!(
            "Message from {}: {}",
            whisper.originator, whisper.text
        )));

        // A failed snapshot is not worth losing the conversation over.
        let context = match self.context.snapshot().await {
            Ok(blob) => blob.to_string(),
            Err(e) => {
                warn!(error = %e, "World snapshot unavailable");
                serde_json::json!({ "error": format!("context unavailable: {e}") }).to_string()
            }
        };
        transcript.push(Turn::system(format!("Game context: {context}")));
        transcript
    }

    /// Relay a text unit to the originator through the reply action.
    ///
    /// The assistant turn is appended even when the send fails: dropping it
    /// would desynchronize the transcript from what the model said.
    async fn send_reply(&self, originator: &str, text: &str, transcript: &mut Transcript) {
        match self.registry.terminal_action() {
            Some(reply_action) => {
                let outcome = self
                    .registry
                    .invoke(
                        reply_action,
                        serde_json::json!({ "username": originator, "message": text }),
                    )
                    .await;
                if outcome.is_error() {
                    warn!(originator, "Reply send failed: {}", outcome.to_json());
                } else {
                    self.event_bus.publish(DomainEvent::ReplySent {
                        originator: originator.to_string(),
                        timestamp: Utc::now(),
                    });
                }
            }
            None => warn!(originator, "No reply action registered; dropping reply text"),
        }
        transcript.push(Turn::assistant(text));
    }

    /// Execute one requested action and feed its outcome back.
    async fn handle_action_request(
        &self,
        id: &str,
        name: &str,
        raw_arguments: &str,
        transcript: &mut Transcript,
    ) {
        let arguments = parse_arguments(raw_arguments);

        transcript.push(Turn::assistant_calls(vec![ActionCall {
            id: id.to_string(),
            name: name.to_string(),
            raw_arguments: raw_arguments.to_string(),
        }]));

        debug!(action = name, "Invoking requested action");
        let started = Instant::now();
        let outcome = self.registry.invoke(name, arguments).await;

        self.event_bus.publish(DomainEvent::ActionInvoked {
            action_name: name.to_string(),
            success: !outcome.is_error(),
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        });

        transcript.push(Turn::action_result(id, outcome.to_json()));
    }

    /// The last-unit termination rule.
    ///
    /// A batch ends the conversation iff its *final* unit is a text reply, or
    /// an action request naming the designated reply action. Units earlier in
    /// the batch never terminate: `[ActionRequest(move_to), TextReply]` stops
    /// while `[TextReply, ActionRequest(move_to)]` continues. The rule is
    /// deliberately order-sensitive and pinned by tests; see DESIGN.md.
    fn batch_terminates(&self, units: &[ResponseUnit]) -> bool {
        match units.last() {
            Some(ResponseUnit::TextReply { .. }) => true,
            Some(ResponseUnit::ActionRequest { name, .. }) => self.registry.is_terminal(name),
            None => true,
        }
    }
}

/// Parse model-produced arguments, degrading malformed input to an empty
/// record rather than failing the call.
fn parse_arguments(raw: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        Ok(other) => {
            warn!(got = %other, "Non-object action arguments; using empty record");
            serde_json::json!({})
        }
        Err(e) => {
            warn!(error = %e, "Malformed action arguments; using empty record");
            serde_json::json!({})
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        registry_with, FaultyAction, RecordingReplyAction, StubContext, StubGateway,
    };
    use cobblemind_core::transcript::Role;

    fn driver_with(
        gateway: Arc<StubGateway>,
        registry: Arc<ActionRegistry>,
    ) -> ConversationDriver {
        ConversationDriver::new(
            gateway,
            registry,
            Arc::new(StubContext::default()),
            "test-model",
            Arc::new(EventBus::default()),
        )
    }

    fn text(text: &str) -> ResponseUnit {
        ResponseUnit::TextReply { text: text.into() }
    }

    fn request(name: &str, raw: &str) -> ResponseUnit {
        ResponseUnit::ActionRequest {
            id: format!("call_{name}"),
            name: name.into(),
            raw_arguments: raw.into(),
        }
    }

    #[tokio::test]
    async fn transcript_is_seeded_with_rules_whisper_and_context() {
        let gateway = Arc::new(StubGateway::scripted(vec![vec![text("hi")]]));
        let (registry, _replies, _moves) = registry_with();
        let driver = driver_with(gateway, registry);

        let summary = driver
            .run_conversation(&Whisper::new("Alice", "where are you?"))
            .await
            .unwrap();

        let turns = &summary.transcript.turns;
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[2].role, Role::System);
        assert!(turns[1].content.contains("Message from Alice: where are you?"));
        assert!(turns[2].content.starts_with("Game context: "));
    }

    #[tokio::test]
    async fn text_reply_sends_exactly_one_reply() {
        let gateway = Arc::new(StubGateway::scripted(vec![vec![text("hello")]]));
        let (registry, replies, moves) = registry_with();
        let driver = driver_with(gateway.clone(), registry);

        driver.process(Whisper::new("Alice", "hi")).await;

        assert_eq!(replies.lock().unwrap().as_slice(), &[("Alice".to_string(), "hello".to_string())]);
        assert!(moves.lock().unwrap().is_empty());
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn iteration_cap_stops_at_exactly_ten_gateway_calls() {
        let gateway = Arc::new(StubGateway::repeating(vec![request(
            "move_to",
            r#"{"x":1,"y":64,"z":1}"#,
        )]));
        let (registry, replies, _moves) = registry_with();
        let driver = driver_with(gateway.clone(), registry);

        let summary = driver
            .run_conversation(&Whisper::new("Alice", "walk forever"))
            .await
            .unwrap();

        assert_eq!(gateway.calls(), 10);
        assert_eq!(summary.iterations, 10);
        assert!(!summary.completed);
        // Silent stop: no forced reply
        assert!(replies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_action_yields_one_error_tool_result() {
        let gateway = Arc::new(StubGateway::scripted(vec![
            vec![request("unknown_action", "{}")],
            vec![text("sorry, I can't do that")],
        ]));
        let (registry, _replies, _moves) = registry_with();
        let driver = driver_with(gateway.clone(), registry);

        let summary = driver
            .run_conversation(&Whisper::new("Alice", "fly"))
            .await
            .unwrap();

        let results: Vec<_> = summary
            .transcript
            .turns
            .iter()
            .filter(|t| t.role == Role::ToolResult)
            .collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].content.contains(r#""status":"error""#));
        assert!(results[0].content.contains("unknown_action"));
        // The model got a chance to self-correct
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn faulty_action_appends_error_and_keeps_iterating() {
        let gateway = Arc::new(StubGateway::scripted(vec![
            vec![request("faulty", "{}")],
            vec![text("that didn't work")],
        ]));
        let mut registry = ActionRegistry::new();
        let replies = RecordingReplyAction::install(&mut registry);
        registry.register(Box::new(FaultyAction));
        let driver = driver_with(gateway.clone(), Arc::new(registry));

        let summary = driver
            .run_conversation(&Whisper::new("Alice", "do the thing"))
            .await
            .unwrap();

        let error_turn = summary
            .transcript
            .turns
            .iter()
            .find(|t| t.role == Role::ToolResult)
            .unwrap();
        assert!(error_turn.content.contains(r#""status":"error""#));
        assert_eq!(gateway.calls(), 2);
        assert_eq!(replies.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_arguments_degrade_to_empty_record() {
        let gateway = Arc::new(StubGateway::scripted(vec![
            vec![request("move_to", "definitely not json")],
            vec![text("done")],
        ]));
        let (registry, _replies, moves) = registry_with();
        let driver = driver_with(gateway, registry);

        driver
            .run_conversation(&Whisper::new("Alice", "move"))
            .await
            .unwrap();

        let received = moves.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], serde_json::json!({}));
    }

    #[tokio::test]
    async fn reply_action_request_terminates_the_conversation() {
        let gateway = Arc::new(StubGateway::repeating(vec![request(
            "whisper",
            r#"{"username":"Alice","message":"hi there"}"#,
        )]));
        let (registry, replies, _moves) = registry_with();
        let driver = driver_with(gateway.clone(), registry);

        let summary = driver
            .run_conversation(&Whisper::new("Alice", "hi"))
            .await
            .unwrap();

        assert!(summary.completed);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(replies.lock().unwrap().as_slice(), &[("Alice".to_string(), "hi there".to_string())]);
    }

    #[tokio::test]
    async fn empty_unit_list_ends_quietly() {
        let gateway = Arc::new(StubGateway::scripted(vec![vec![]]));
        let (registry, replies, _moves) = registry_with();
        let driver = driver_with(gateway.clone(), registry);

        let summary = driver
            .run_conversation(&Whisper::new("Alice", "hi"))
            .await
            .unwrap();

        assert!(summary.completed);
        assert_eq!(gateway.calls(), 1);
        assert!(replies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn gateway_failure_never_escapes_process() {
        let gateway = Arc::new(StubGateway::failing());
        let (registry, replies, _moves) = registry_with();
        let driver = driver_with(gateway, registry);

        // Must not panic or propagate
        driver.process(Whisper::new("Alice", "hi")).await;
        assert!(replies.lock().unwrap().is_empty());
    }

    // --- the last-unit rule, pinned in both orderings ---

    #[tokio::test]
    async fn action_then_text_stops() {
        let gateway = Arc::new(StubGateway::repeating(vec![
            request("move_to", r#"{"x":0,"y":64,"z":0}"#),
            text("on my way"),
        ]));
        let (registry, _replies, _moves) = registry_with();
        let driver = driver_with(gateway.clone(), registry);

        let summary = driver
            .run_conversation(&Whisper::new("Alice", "come here"))
            .await
            .unwrap();
        assert!(summary.completed);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn text_then_action_continues() {
        let gateway = Arc::new(StubGateway::scripted(vec![
            vec![text("on my way"), request("move_to", r#"{"x":0,"y":64,"z":0}"#)],
            vec![text("arrived")],
        ]));
        let (registry, _replies, _moves) = registry_with();
        let driver = driver_with(gateway.clone(), registry);

        let summary = driver
            .run_conversation(&Whisper::new("Alice", "come here"))
            .await
            .unwrap();
        assert!(summary.completed);
        assert_eq!(gateway.calls(), 2);
    }

    #[test]
    fn parse_arguments_accepts_objects_only() {
        assert_eq!(
            parse_arguments(r#"{"x": 1}"#),
            serde_json::json!({"x": 1})
        );
        assert_eq!(parse_arguments("not json"), serde_json::json!({}));
        assert_eq!(parse_arguments("[1, 2]"), serde_json::json!({}));
        assert_eq!(parse_arguments(""), serde_json::json!({}));
    }
}
