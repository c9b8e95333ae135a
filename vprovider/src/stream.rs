//! Chunk stream contracts and in-memory stream utilities.
//!
//! ```rust
//! use vprovider::{ChatChunk, ChunkStream, VecChunkStream};
//!
//! let stream = VecChunkStream::new(vec![Ok(ChatChunk::token("hola"))]);
//! let _boxed: ChunkStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::{ChatChunk, ProviderError};

/// Provider chunk stream contract.
///
/// Invariants for consumers:
/// - Chunks are emitted in the order the remote produced them.
/// - An `Err` item is terminal; nothing follows it.
/// - Once the stream yields `None`, it must not yield additional items.
/// - Dropping the stream early releases the underlying connection.
pub trait ChatChunkStream: Stream<Item = Result<ChatChunk, ProviderError>> + Send {}

impl<T> ChatChunkStream for T where T: Stream<Item = Result<ChatChunk, ProviderError>> + Send {}

pub type ChunkStream<'a> = Pin<Box<dyn ChatChunkStream + 'a>>;

#[derive(Debug)]
pub struct VecChunkStream {
    chunks: VecDeque<Result<ChatChunk, ProviderError>>,
}

impl VecChunkStream {
    pub fn new(chunks: Vec<Result<ChatChunk, ProviderError>>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }

    pub fn tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            tokens
                .into_iter()
                .map(|token| Ok(ChatChunk::token(token)))
                .collect(),
        )
    }
}

impl Stream for VecChunkStream {
    type Item = Result<ChatChunk, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<ChatChunk, ProviderError>>> {
        Poll::Ready(self.chunks.pop_front())
    }
}
