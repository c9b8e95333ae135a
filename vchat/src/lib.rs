//! Agent response orchestration over streaming providers, with bounded
//! conversation history and profile grounding.

#[cfg(any(test, feature = "test-support"))]
pub mod contract;
mod error;
mod history;
mod hooks;
mod profile;
mod service;

pub mod prelude {
    pub use crate::{
        AgentHooks, AgentPhase, AgentRequest, AgentService, AgentServiceBuilder, ChatError,
        ChatErrorKind, ChatErrorPhase, ChatEventStream, ConversationHistory, ConversationSummary,
        InMemoryConversationHistory, JsonFileProfileRepository, Message, NoopAgentHooks,
        ProfileRepository, StaticProfileRepository,
    };
    pub use vcommon::{BoxFuture, ConversationId};
    pub use vprovider::{ChatChunk, ChunkKind, ContextMap, Role};
}

pub use error::{ChatError, ChatErrorKind, ChatErrorPhase};
pub use history::{
    ConversationHistory, ConversationSummary, DEFAULT_MAX_MESSAGES, InMemoryConversationHistory,
    Message,
};
pub use hooks::{AgentHooks, AgentPhase, NoopAgentHooks};
pub use profile::{
    DEFAULT_PROFILE_PATH, JsonFileProfileRepository, ProfileRepository, StaticProfileRepository,
};
pub use service::{AgentRequest, AgentService, AgentServiceBuilder, ChatEventStream};
pub use vcommon::{BoxFuture, ConversationId};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{ConversationHistory, InMemoryConversationHistory};

    #[tokio::test]
    async fn in_memory_history_honors_history_contract() {
        let make = || {
            Arc::new(InMemoryConversationHistory::new().with_max_messages(4))
                as Arc<dyn ConversationHistory>
        };
        crate::contract::run_all(make, 4).await;
    }

    #[tokio::test]
    async fn in_memory_history_defaults_to_twenty_messages() {
        let history = InMemoryConversationHistory::new();
        assert_eq!(history.max_messages(), crate::DEFAULT_MAX_MESSAGES);
        crate::contract::append_trims_to_most_recent(&history, 20).await;
    }

    #[test]
    fn zero_cap_is_raised_to_one() {
        assert_eq!(InMemoryConversationHistory::new().with_max_messages(0).max_messages(), 1);
    }
}
