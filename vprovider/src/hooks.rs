//! Operational hook contracts for provider requests and stream decoding.

use crate::{ProviderError, ProviderId};

/// A single incremental frame that could not be decoded and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub provider: ProviderId,
    pub payload: String,
    pub reason: String,
}

impl ParseWarning {
    const MAX_PAYLOAD_BYTES: usize = 256;

    pub fn new(provider: ProviderId, payload: &str, reason: impl Into<String>) -> Self {
        Self {
            provider,
            payload: vcommon::truncate_utf8(payload, Self::MAX_PAYLOAD_BYTES),
            reason: reason.into(),
        }
    }
}

pub trait ProviderStreamHooks: Send + Sync {
    fn on_request_start(&self, _provider: ProviderId, _model: &str) {}

    fn on_request_failure(&self, _provider: ProviderId, _error: &ProviderError) {}

    fn on_parse_warning(&self, _warning: &ParseWarning) {}

    fn on_preamble_fallback(&self, _provider: ProviderId, _source: &str, _reason: &str) {}

    fn on_stream_complete(&self, _provider: ProviderId, _chunks: usize) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStreamHooks;

impl ProviderStreamHooks for NoopStreamHooks {}
