//! Agent-layer errors, their kinds and the pipeline phase that raised them.

use std::error::Error;
use std::fmt::{Display, Formatter};

use vprovider::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidPrompt,
    InvalidConversationId,
    Provider,
    HistoryStore,
    ProfileUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorPhase {
    Validation,
    History,
    Profile,
    Generation,
    Persistence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub phase: Option<ChatErrorPhase>,
    pub message: String,
    /// Remote status when the failure came from a provider response.
    pub status: Option<u16>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            phase: None,
            message: message.into(),
            status: None,
        }
    }

    pub fn invalid_prompt(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidPrompt, message).with_phase(ChatErrorPhase::Validation)
    }

    pub fn invalid_conversation_id(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidConversationId, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Provider, message).with_phase(ChatErrorPhase::Generation)
    }

    pub fn history_store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::HistoryStore, message)
    }

    pub fn profile_unavailable(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ProfileUnavailable, message).with_phase(ChatErrorPhase::Profile)
    }

    pub fn with_phase(mut self, phase: ChatErrorPhase) -> Self {
        self.phase = Some(phase);
        self
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        let status = value.status;
        Self {
            status,
            ..ChatError::provider(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_keep_status_and_generation_phase() {
        let error = ChatError::from(ProviderError::http_status(502, "bad gateway"));

        assert_eq!(error.kind, ChatErrorKind::Provider);
        assert_eq!(error.phase, Some(ChatErrorPhase::Generation));
        assert_eq!(error.status, Some(502));
        assert_eq!(error.to_string(), "Provider: Unavailable: http 502: bad gateway");
    }

    #[test]
    fn with_phase_overrides_default_phase() {
        let error = ChatError::history_store("disk full").with_phase(ChatErrorPhase::Persistence);
        assert_eq!(error.phase, Some(ChatErrorPhase::Persistence));
        assert_eq!(error.kind, ChatErrorKind::HistoryStore);
    }
}
