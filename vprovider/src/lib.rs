//! Streaming inference providers and the wire decoders behind them.
//!
//! ```rust
//! use futures_util::StreamExt;
//! use vprovider::prelude::*;
//!
//! # async fn run() -> Result<(), ProviderError> {
//! let provider = PlaceholderProvider;
//! let mut stream = provider
//!     .stream_chat(ChatRequest::new("Hola", RequestContext::new()))
//!     .await?;
//!
//! let chunk = stream.next().await.expect("one chunk")?;
//! assert_eq!(chunk.kind, ChunkKind::Info);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
mod credentials;
mod decode;
mod error;
mod hooks;
mod model;
mod preamble;
pub mod prelude;
mod provider;
mod stream;
mod transport;

pub use adapters::cloudflare::{
    CLOUDFLARE_BASE_URL, CLOUDFLARE_DEFAULT_MODEL, CloudflareProvider, build_messages,
};
pub use adapters::ollama::{OLLAMA_BASE_URL, OLLAMA_DEFAULT_MODEL, OllamaProvider, render_prompt};
pub use adapters::placeholder::{PLACEHOLDER_NOTICE, PlaceholderProvider};
pub use credentials::SecretString;
pub use decode::{Frame, LineBuffer, WireFormat, decode_stream};
pub use error::{MAX_ERROR_BODY_BYTES, ProviderError, ProviderErrorKind};
pub use hooks::{NoopStreamHooks, ParseWarning, ProviderStreamHooks};
pub use model::{
    ChatChunk, ChatRequest, ChunkKind, ContextMap, HISTORY_CONTEXT_KEY, HistoryMessage,
    PROFILE_CONTEXT_KEY, ProviderId, RequestContext, Role,
};
pub use preamble::{DEFAULT_PREAMBLE, DEFAULT_PREAMBLE_PATH, Preamble, PreambleSource};
pub use provider::{ChatProvider, ProviderFuture};
pub use stream::{ChatChunkStream, ChunkStream, VecChunkStream};
#[cfg(feature = "http-transport")]
pub use transport::HttpTransport;
pub use transport::{ByteStream, StreamTransport, TransportRequest};
