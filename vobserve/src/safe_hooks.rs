use std::panic::{AssertUnwindSafe, catch_unwind};

use vchat::{AgentHooks, AgentPhase, ChatError};
use vcommon::ConversationId;
use vprovider::{ParseWarning, ProviderError, ProviderId, ProviderStreamHooks};

/// Runs the inner stream hooks, discarding any panic they raise.
pub struct SafeStreamHooks<H> {
    inner: H,
}

impl<H> SafeStreamHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderStreamHooks for SafeStreamHooks<H>
where
    H: ProviderStreamHooks,
{
    fn on_request_start(&self, provider: ProviderId, model: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_request_start(provider, model)
        }));
    }

    fn on_request_failure(&self, provider: ProviderId, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_request_failure(provider, error)
        }));
    }

    fn on_parse_warning(&self, warning: &ParseWarning) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_parse_warning(warning)));
    }

    fn on_preamble_fallback(&self, provider: ProviderId, source: &str, reason: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_preamble_fallback(provider, source, reason)
        }));
    }

    fn on_stream_complete(&self, provider: ProviderId, chunks: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_stream_complete(provider, chunks)
        }));
    }
}

pub struct SafeAgentHooks<H> {
    inner: H,
}

impl<H> SafeAgentHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> AgentHooks for SafeAgentHooks<H>
where
    H: AgentHooks,
{
    fn on_phase_start(&self, phase: AgentPhase, conversation: Option<&ConversationId>) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_phase_start(phase, conversation)
        }));
    }

    fn on_turn_complete(&self, conversation: Option<&ConversationId>, chunks: usize, chars: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_complete(conversation, chunks, chars)
        }));
    }

    fn on_turn_failure(&self, conversation: Option<&ConversationId>, error: &ChatError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_failure(conversation, error)
        }));
    }
}
