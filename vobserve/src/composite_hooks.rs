use vchat::{AgentHooks, AgentPhase, ChatError};
use vcommon::ConversationId;
use vprovider::{ParseWarning, ProviderError, ProviderId, ProviderStreamHooks};

/// Forwards every callback to `first`, then to `second`.
pub struct CompositeStreamHooks<A, B> {
    first: A,
    second: B,
}

impl<A, B> CompositeStreamHooks<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> ProviderStreamHooks for CompositeStreamHooks<A, B>
where
    A: ProviderStreamHooks,
    B: ProviderStreamHooks,
{
    fn on_request_start(&self, provider: ProviderId, model: &str) {
        self.first.on_request_start(provider, model);
        self.second.on_request_start(provider, model);
    }

    fn on_request_failure(&self, provider: ProviderId, error: &ProviderError) {
        self.first.on_request_failure(provider, error);
        self.second.on_request_failure(provider, error);
    }

    fn on_parse_warning(&self, warning: &ParseWarning) {
        self.first.on_parse_warning(warning);
        self.second.on_parse_warning(warning);
    }

    fn on_preamble_fallback(&self, provider: ProviderId, source: &str, reason: &str) {
        self.first.on_preamble_fallback(provider, source, reason);
        self.second.on_preamble_fallback(provider, source, reason);
    }

    fn on_stream_complete(&self, provider: ProviderId, chunks: usize) {
        self.first.on_stream_complete(provider, chunks);
        self.second.on_stream_complete(provider, chunks);
    }
}

pub struct CompositeAgentHooks<A, B> {
    first: A,
    second: B,
}

impl<A, B> CompositeAgentHooks<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> AgentHooks for CompositeAgentHooks<A, B>
where
    A: AgentHooks,
    B: AgentHooks,
{
    fn on_phase_start(&self, phase: AgentPhase, conversation: Option<&ConversationId>) {
        self.first.on_phase_start(phase, conversation);
        self.second.on_phase_start(phase, conversation);
    }

    fn on_turn_complete(&self, conversation: Option<&ConversationId>, chunks: usize, chars: usize) {
        self.first.on_turn_complete(conversation, chunks, chars);
        self.second.on_turn_complete(conversation, chunks, chars);
    }

    fn on_turn_failure(&self, conversation: Option<&ConversationId>, error: &ChatError) {
        self.first.on_turn_failure(conversation, error);
        self.second.on_turn_failure(conversation, error);
    }
}
