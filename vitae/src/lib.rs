//! Unified facade over the vitae workspace crates.
//!
//! Most applications depend on this crate alone: it re-exports the provider,
//! orchestration, storage and observability crates, builds a provider from a
//! [`ProviderConfig`] and wires everything into a [`RuntimeBundle`].
//!
//! ```rust
//! use futures_util::StreamExt;
//! use vitae::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = build_runtime(&RuntimeConfig::new(ProviderConfig::Placeholder))?;
//! let mut stream = runtime.agent.stream_response(AgentRequest::new("Hola"));
//! let chunk = stream.next().await.expect("one chunk")?;
//! assert_eq!(chunk.kind, ChunkKind::Info);
//! # Ok(())
//! # }
//! ```

mod error;

pub mod prelude;
pub mod providers;
pub mod runtime;

pub use vchat;
pub use vcommon;
pub use vmemory;
pub use vobserve;
pub use vprovider;

pub use error::{RuntimeError, RuntimeErrorKind};
pub use providers::{ProviderConfig, build_provider, build_provider_with_transport};
pub use runtime::{
    DEFAULT_REQUEST_TIMEOUT, HistoryConfig, RuntimeBundle, RuntimeConfig, RuntimeHooks,
    build_runtime, build_runtime_with, build_runtime_with_hooks, open_history,
};

pub use vchat::{
    AgentHooks, AgentPhase, AgentRequest, AgentService, AgentServiceBuilder, ChatError,
    ChatErrorKind, ChatErrorPhase, ChatEventStream, ConversationHistory, ConversationSummary,
    DEFAULT_MAX_MESSAGES, DEFAULT_PROFILE_PATH, InMemoryConversationHistory,
    JsonFileProfileRepository, Message, NoopAgentHooks, ProfileRepository,
    StaticProfileRepository,
};
pub use vcommon::{BoxFuture, ConversationId};
pub use vmemory::{MemoryError, MemoryErrorKind, SqliteConversationHistory};
pub use vobserve::{
    CompositeAgentHooks, CompositeStreamHooks, MetricsObservabilityHooks, SafeAgentHooks,
    SafeStreamHooks, TracingObservabilityHooks,
};
pub use vprovider::{
    CLOUDFLARE_DEFAULT_MODEL, ChatChunk, ChatProvider, ChatRequest, ChunkKind, ContextMap,
    DEFAULT_PREAMBLE, DEFAULT_PREAMBLE_PATH, NoopStreamHooks, OLLAMA_DEFAULT_MODEL,
    PLACEHOLDER_NOTICE, PreambleSource, ProviderError, ProviderErrorKind, ProviderId,
    ProviderStreamHooks, RequestContext, Role, SecretString,
};
