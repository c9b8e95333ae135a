use std::future::Future;
use std::pin::Pin;

use crate::{ChatRequest, ChunkStream, ProviderError, ProviderId};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A streaming inference back end.
///
/// The returned future resolves once the outbound request has been accepted;
/// chunks then arrive lazily as the remote produces them.
pub trait ChatProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn stream_chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChunkStream<'a>, ProviderError>>;
}
