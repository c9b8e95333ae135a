//! Metrics-based observability hooks for provider streams and agent turns.
//!
//! ```rust
//! use vobserve::MetricsObservabilityHooks;
//! use vprovider::ProviderStreamHooks;
//!
//! fn accepts_stream_hooks(_hooks: &dyn ProviderStreamHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_stream_hooks(&hooks);
//! ```

use vchat::{AgentHooks, AgentPhase, ChatError};
use vcommon::ConversationId;
use vprovider::{ParseWarning, ProviderError, ProviderId, ProviderStreamHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderStreamHooks for MetricsObservabilityHooks {
    fn on_request_start(&self, provider: ProviderId, model: &str) {
        metrics::counter!(
            "vitae_provider_request_start_total",
            "provider" => provider.to_string(),
            "model" => model.to_string()
        )
        .increment(1);
    }

    fn on_request_failure(&self, provider: ProviderId, error: &ProviderError) {
        metrics::counter!(
            "vitae_provider_request_failure_total",
            "provider" => provider.to_string(),
            "error_kind" => format!("{:?}", error.kind),
            "transport_failure" => error.is_transport_failure().to_string()
        )
        .increment(1);
    }

    fn on_parse_warning(&self, warning: &ParseWarning) {
        metrics::counter!(
            "vitae_provider_parse_warning_total",
            "provider" => warning.provider.to_string()
        )
        .increment(1);
    }

    fn on_preamble_fallback(&self, provider: ProviderId, _source: &str, _reason: &str) {
        metrics::counter!(
            "vitae_provider_preamble_fallback_total",
            "provider" => provider.to_string()
        )
        .increment(1);
    }

    fn on_stream_complete(&self, provider: ProviderId, chunks: usize) {
        metrics::counter!(
            "vitae_provider_stream_complete_total",
            "provider" => provider.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "vitae_provider_chunks_per_stream",
            "provider" => provider.to_string()
        )
        .record(chunks as f64);
    }
}

impl AgentHooks for MetricsObservabilityHooks {
    fn on_phase_start(&self, phase: AgentPhase, _conversation: Option<&ConversationId>) {
        metrics::counter!(
            "vitae_agent_phase_start_total",
            "step" => phase.as_str()
        )
        .increment(1);
    }

    fn on_turn_complete(&self, _conversation: Option<&ConversationId>, chunks: usize, chars: usize) {
        metrics::counter!("vitae_agent_turn_complete_total").increment(1);
        metrics::histogram!("vitae_agent_chunks_per_turn").record(chunks as f64);
        metrics::histogram!("vitae_agent_chars_per_turn").record(chars as f64);
    }

    fn on_turn_failure(&self, _conversation: Option<&ConversationId>, error: &ChatError) {
        metrics::counter!(
            "vitae_agent_turn_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}
