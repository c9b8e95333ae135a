//! Lifecycle hooks for agent turns.

use std::fmt::{Display, Formatter};

use vcommon::ConversationId;

use crate::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentPhase {
    Validate,
    FetchHistory,
    LoadProfile,
    RecordUserMessage,
    Stream,
    RecordAssistantMessage,
}

impl AgentPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::FetchHistory => "fetch_history",
            Self::LoadProfile => "load_profile",
            Self::RecordUserMessage => "record_user_message",
            Self::Stream => "stream",
            Self::RecordAssistantMessage => "record_assistant_message",
        }
    }
}

impl Display for AgentPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait AgentHooks: Send + Sync {
    fn on_phase_start(&self, _phase: AgentPhase, _conversation: Option<&ConversationId>) {}

    fn on_turn_complete(
        &self,
        _conversation: Option<&ConversationId>,
        _chunks: usize,
        _chars: usize,
    ) {
    }

    fn on_turn_failure(&self, _conversation: Option<&ConversationId>, _error: &ChatError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAgentHooks;

impl AgentHooks for NoopAgentHooks {}
