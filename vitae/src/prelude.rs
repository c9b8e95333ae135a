//! Common imports for most vitae applications.

pub use crate::{
    AgentRequest, AgentService, ChatChunk, ChatError, ChatErrorKind, ChatProvider, ChunkKind,
    ContextMap, ConversationHistory, ConversationId, ConversationSummary, HistoryConfig, Message,
    PreambleSource, ProviderConfig, ProviderError, ProviderId, Role, RuntimeBundle, RuntimeConfig,
    RuntimeError, RuntimeHooks, SecretString,
};
pub use crate::{build_provider, build_runtime, build_runtime_with, build_runtime_with_hooks};
