//! Tracing-based observability hooks for provider streams and agent turns.
//!
//! ```rust
//! use vchat::AgentHooks;
//! use vobserve::TracingObservabilityHooks;
//!
//! fn accepts_agent_hooks(_hooks: &dyn AgentHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_agent_hooks(&hooks);
//! ```

use vchat::{AgentHooks, AgentPhase, ChatError};
use vcommon::ConversationId;
use vprovider::{ParseWarning, ProviderError, ProviderId, ProviderStreamHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderStreamHooks for TracingObservabilityHooks {
    fn on_request_start(&self, provider: ProviderId, model: &str) {
        tracing::info!(
            phase = "provider",
            event = "request_start",
            provider = %provider,
            model
        );
    }

    fn on_request_failure(&self, provider: ProviderId, error: &ProviderError) {
        tracing::error!(
            phase = "provider",
            event = "request_failure",
            provider = %provider,
            error_kind = ?error.kind,
            status = error.status,
            retryable = error.retryable,
            transport_failure = error.is_transport_failure(),
            error = %error
        );
    }

    fn on_parse_warning(&self, warning: &ParseWarning) {
        tracing::warn!(
            phase = "provider",
            event = "parse_warning",
            provider = %warning.provider,
            reason = %warning.reason,
            payload = %warning.payload
        );
    }

    fn on_preamble_fallback(&self, provider: ProviderId, source: &str, reason: &str) {
        tracing::warn!(
            phase = "provider",
            event = "preamble_fallback",
            provider = %provider,
            source,
            reason
        );
    }

    fn on_stream_complete(&self, provider: ProviderId, chunks: usize) {
        tracing::info!(
            phase = "provider",
            event = "stream_complete",
            provider = %provider,
            chunks
        );
    }
}

impl AgentHooks for TracingObservabilityHooks {
    fn on_phase_start(&self, phase: AgentPhase, conversation: Option<&ConversationId>) {
        tracing::debug!(
            phase = "agent",
            event = "phase_start",
            step = %phase,
            conversation_id = conversation.map(ConversationId::as_str)
        );
    }

    fn on_turn_complete(&self, conversation: Option<&ConversationId>, chunks: usize, chars: usize) {
        tracing::info!(
            phase = "agent",
            event = "turn_complete",
            conversation_id = conversation.map(ConversationId::as_str),
            chunks,
            chars
        );
    }

    fn on_turn_failure(&self, conversation: Option<&ConversationId>, error: &ChatError) {
        tracing::error!(
            phase = "agent",
            event = "turn_failure",
            conversation_id = conversation.map(ConversationId::as_str),
            error_kind = ?error.kind,
            error_phase = ?error.phase,
            error = %error
        );
    }
}
