//! Provider used when no inference back end is configured.

use crate::{
    ChatChunk, ChatProvider, ChatRequest, ChunkStream, ProviderError, ProviderFuture, ProviderId,
    VecChunkStream,
};

pub const PLACEHOLDER_NOTICE: &str =
    "LLM no configurado. Implementa el cliente real más adelante.";

/// Answers every request with a single informational chunk.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderProvider;

impl ChatProvider for PlaceholderProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Placeholder
    }

    fn stream_chat<'a>(
        &'a self,
        _request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            let stream = VecChunkStream::new(vec![Ok(ChatChunk::info(PLACEHOLDER_NOTICE))]);
            Ok(Box::pin(stream) as ChunkStream<'a>)
        })
    }
}
