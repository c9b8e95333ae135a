//! Outbound streaming transport seam and the reqwest implementation.

use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use serde_json::Value;

use crate::{ProviderError, ProviderFuture, SecretString};

pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = Result<Bytes, ProviderError>> + Send + 'a>>;

/// A JSON POST whose response body is consumed incrementally.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub bearer_token: Option<SecretString>,
    pub body: Value,
}

impl TransportRequest {
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            bearer_token: None,
            body,
        }
    }

    pub fn with_bearer_token(mut self, token: SecretString) -> Self {
        self.bearer_token = Some(token);
        self
    }
}

/// Sends a request and hands back the raw response body as it arrives.
///
/// Implementations must report a non-success status as
/// [`ProviderError::http_status`] before any body bytes are yielded.
pub trait StreamTransport: Send + Sync + std::fmt::Debug {
    fn post_stream<'a>(
        &'a self,
        request: TransportRequest,
    ) -> ProviderFuture<'a, Result<ByteStream<'a>, ProviderError>>;
}

#[cfg(feature = "http-transport")]
pub use http::HttpTransport;

#[cfg(feature = "http-transport")]
mod http {
    use futures_util::StreamExt;
    use reqwest::Client;

    use super::{ByteStream, StreamTransport, TransportRequest};
    use crate::{ProviderError, ProviderFuture};

    #[derive(Debug, Clone, Default)]
    pub struct HttpTransport {
        client: Client,
    }

    impl HttpTransport {
        pub fn new(client: Client) -> Self {
            Self { client }
        }

        fn map_send_error(err: reqwest::Error) -> ProviderError {
            if err.is_timeout() {
                ProviderError::timeout(err.to_string())
            } else {
                ProviderError::transport(err.to_string())
            }
        }
    }

    impl StreamTransport for HttpTransport {
        fn post_stream<'a>(
            &'a self,
            request: TransportRequest,
        ) -> ProviderFuture<'a, Result<ByteStream<'a>, ProviderError>> {
            Box::pin(async move {
                let mut builder = self.client.post(&request.url).json(&request.body);
                if let Some(token) = &request.bearer_token {
                    builder = builder.bearer_auth(token.expose());
                }

                let response = builder.send().await.map_err(Self::map_send_error)?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ProviderError::http_status(status.as_u16(), &body));
                }

                let body = response
                    .bytes_stream()
                    .map(|item| item.map_err(Self::map_send_error));
                let stream: ByteStream<'a> = Box::pin(body);
                Ok(stream)
            })
        }
    }
}
