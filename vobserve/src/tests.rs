use std::sync::{Arc, Mutex};

use vchat::{AgentHooks, AgentPhase, ChatError};
use vcommon::ConversationId;
use vprovider::{ParseWarning, ProviderError, ProviderId, ProviderStreamHooks};

use crate::{
    CompositeAgentHooks, CompositeStreamHooks, MetricsObservabilityHooks, SafeAgentHooks,
    SafeStreamHooks, TracingObservabilityHooks,
};

fn exercise_stream_hooks(hooks: &dyn ProviderStreamHooks) {
    hooks.on_request_start(ProviderId::Ollama, "ai/llama3.2:latest");
    hooks.on_request_failure(
        ProviderId::Cloudflare,
        &ProviderError::http_status(401, "bad token"),
    );
    hooks.on_parse_warning(&ParseWarning::new(
        ProviderId::Ollama,
        "not-json",
        "expected value",
    ));
    hooks.on_preamble_fallback(ProviderId::Ollama, "PROMPT.md", "not found");
    hooks.on_stream_complete(ProviderId::Cloudflare, 3);
}

fn exercise_agent_hooks(hooks: &dyn AgentHooks) {
    let conversation = ConversationId::from("conv-1");
    hooks.on_phase_start(AgentPhase::Validate, None);
    hooks.on_phase_start(AgentPhase::FetchHistory, Some(&conversation));
    hooks.on_turn_complete(Some(&conversation), 2, 11);
    hooks.on_turn_failure(None, &ChatError::invalid_prompt("empty"));
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    exercise_stream_hooks(&TracingObservabilityHooks);
    exercise_agent_hooks(&TracingObservabilityHooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    exercise_stream_hooks(&MetricsObservabilityHooks);
    exercise_agent_hooks(&MetricsObservabilityHooks);
}

#[derive(Clone, Default)]
struct RecordingHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingHooks {
    fn record(&self, event: &'static str) {
        self.events.lock().expect("events lock").push(event);
    }

    fn events(&self) -> Vec<&'static str> {
        self.events.lock().expect("events lock").clone()
    }
}

impl ProviderStreamHooks for RecordingHooks {
    fn on_request_start(&self, _provider: ProviderId, _model: &str) {
        self.record("request_start");
    }

    fn on_request_failure(&self, _provider: ProviderId, _error: &ProviderError) {
        self.record("request_failure");
    }

    fn on_parse_warning(&self, _warning: &ParseWarning) {
        self.record("parse_warning");
    }

    fn on_preamble_fallback(&self, _provider: ProviderId, _source: &str, _reason: &str) {
        self.record("preamble_fallback");
    }

    fn on_stream_complete(&self, _provider: ProviderId, _chunks: usize) {
        self.record("stream_complete");
    }
}

impl AgentHooks for RecordingHooks {
    fn on_phase_start(&self, _phase: AgentPhase, _conversation: Option<&ConversationId>) {
        self.record("phase_start");
    }

    fn on_turn_complete(&self, _conversation: Option<&ConversationId>, _chunks: usize, _chars: usize) {
        self.record("turn_complete");
    }

    fn on_turn_failure(&self, _conversation: Option<&ConversationId>, _error: &ChatError) {
        self.record("turn_failure");
    }
}

struct PanicHooks;

impl ProviderStreamHooks for PanicHooks {
    fn on_request_start(&self, _provider: ProviderId, _model: &str) {
        panic!("request_start panic");
    }

    fn on_request_failure(&self, _provider: ProviderId, _error: &ProviderError) {
        panic!("request_failure panic");
    }

    fn on_parse_warning(&self, _warning: &ParseWarning) {
        panic!("parse_warning panic");
    }

    fn on_preamble_fallback(&self, _provider: ProviderId, _source: &str, _reason: &str) {
        panic!("preamble_fallback panic");
    }

    fn on_stream_complete(&self, _provider: ProviderId, _chunks: usize) {
        panic!("stream_complete panic");
    }
}

impl AgentHooks for PanicHooks {
    fn on_phase_start(&self, _phase: AgentPhase, _conversation: Option<&ConversationId>) {
        panic!("phase_start panic");
    }

    fn on_turn_complete(&self, _conversation: Option<&ConversationId>, _chunks: usize, _chars: usize) {
        panic!("turn_complete panic");
    }

    fn on_turn_failure(&self, _conversation: Option<&ConversationId>, _error: &ChatError) {
        panic!("turn_failure panic");
    }
}

#[test]
fn safe_stream_hooks_delegate_when_inner_succeeds() {
    let recording = RecordingHooks::default();
    exercise_stream_hooks(&SafeStreamHooks::new(recording.clone()));

    assert_eq!(
        recording.events(),
        vec![
            "request_start",
            "request_failure",
            "parse_warning",
            "preamble_fallback",
            "stream_complete"
        ]
    );
}

#[test]
fn safe_agent_hooks_delegate_when_inner_succeeds() {
    let recording = RecordingHooks::default();
    exercise_agent_hooks(&SafeAgentHooks::new(recording.clone()));

    assert_eq!(
        recording.events(),
        vec!["phase_start", "phase_start", "turn_complete", "turn_failure"]
    );
}

#[test]
fn safe_hooks_swallow_panics() {
    exercise_stream_hooks(&SafeStreamHooks::new(PanicHooks));
    exercise_agent_hooks(&SafeAgentHooks::new(PanicHooks));
}

#[test]
fn composite_hooks_forward_to_both_sides_in_order() {
    let first = RecordingHooks::default();
    let second = RecordingHooks::default();
    exercise_stream_hooks(&CompositeStreamHooks::new(first.clone(), second.clone()));
    exercise_agent_hooks(&CompositeAgentHooks::new(first.clone(), second.clone()));

    let expected = vec![
        "request_start",
        "request_failure",
        "parse_warning",
        "preamble_fallback",
        "stream_complete",
        "phase_start",
        "phase_start",
        "turn_complete",
        "turn_failure",
    ];
    assert_eq!(first.events(), expected);
    assert_eq!(second.events(), expected);
}

#[test]
fn composite_of_safe_hooks_survives_a_panicking_side() {
    let recording = RecordingHooks::default();
    let hooks = CompositeStreamHooks::new(
        SafeStreamHooks::new(PanicHooks),
        SafeStreamHooks::new(recording.clone()),
    );
    hooks.on_request_failure(
        ProviderId::Ollama,
        &ProviderError::transport("connection refused"),
    );

    assert_eq!(recording.events(), vec!["request_failure"]);
}

#[test]
fn tracing_and_metrics_together_smoke_test_all_callbacks() {
    exercise_stream_hooks(&CompositeStreamHooks::new(
        TracingObservabilityHooks,
        MetricsObservabilityHooks,
    ));
    exercise_agent_hooks(&CompositeAgentHooks::new(
        TracingObservabilityHooks,
        MetricsObservabilityHooks,
    ));
}
