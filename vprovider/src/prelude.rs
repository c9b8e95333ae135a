//! Common `vprovider` imports for downstream crates.

pub use crate::{
    ChatChunk, ChatProvider, ChatRequest, ChunkKind, ChunkStream, CloudflareProvider, ContextMap,
    HistoryMessage, NoopStreamHooks, OllamaProvider, ParseWarning, PlaceholderProvider,
    PreambleSource, ProviderError, ProviderErrorKind, ProviderId, ProviderStreamHooks,
    RequestContext, Role, SecretString, StreamTransport,
};
pub use vcommon::{BoxFuture, ConversationId};
