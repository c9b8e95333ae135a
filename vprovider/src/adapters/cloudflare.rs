//! Cloud inference provider for Workers AI `ai/run` endpoints.
//!
//! Requests carry a structured message list; the response is an event stream
//! of `data:` frames ending with a `DONE` sentinel.

use std::sync::Arc;

use serde::Serialize;

use crate::decode::{WireFormat, decode_stream};
use crate::{
    ChatProvider, ChatRequest, ChunkStream, HistoryMessage, NoopStreamHooks, Preamble,
    PreambleSource, ProviderError, ProviderFuture, ProviderId, ProviderStreamHooks,
    RequestContext, Role, SecretString, StreamTransport, TransportRequest,
};

pub const CLOUDFLARE_BASE_URL: &str = "https://api.cloudflare.com/client/v4/accounts";
pub const CLOUDFLARE_DEFAULT_MODEL: &str = "@cf/meta/llama-3-8b-instruct";

#[derive(Clone)]
pub struct CloudflareProvider {
    transport: Arc<dyn StreamTransport>,
    base_url: String,
    account_id: String,
    api_token: SecretString,
    model: String,
    preamble: Arc<Preamble>,
    hooks: Arc<dyn ProviderStreamHooks>,
}

impl CloudflareProvider {
    pub fn new(
        transport: Arc<dyn StreamTransport>,
        account_id: impl Into<String>,
        api_token: SecretString,
    ) -> Self {
        Self {
            transport,
            base_url: CLOUDFLARE_BASE_URL.to_string(),
            account_id: account_id.into(),
            api_token,
            model: CLOUDFLARE_DEFAULT_MODEL.to_string(),
            preamble: Arc::new(Preamble::default()),
            hooks: Arc::new(NoopStreamHooks),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_preamble(mut self, source: PreambleSource) -> Self {
        self.preamble = Arc::new(Preamble::new(source));
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderStreamHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/ai/run/{}",
            self.base_url.trim_end_matches('/'),
            self.account_id,
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    messages: &'a [HistoryMessage],
    stream: bool,
}

/// System message (preamble and profile), then the transcript, then the question.
pub fn build_messages(
    preamble: &str,
    prompt: &str,
    context: &RequestContext,
) -> Vec<HistoryMessage> {
    let system = format!("{preamble}\n\n### DATOS DEL CV:\n{}", context.profile_text());

    let mut messages = vec![HistoryMessage::new(Role::System, system)];
    messages.extend(context.history());
    messages.push(HistoryMessage::new(Role::User, prompt));
    messages
}

impl ChatProvider for CloudflareProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Cloudflare
    }

    fn stream_chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            let preamble = self
                .preamble
                .load(ProviderId::Cloudflare, self.hooks.as_ref())
                .await;
            let messages = build_messages(preamble, &request.prompt, &request.context);
            let body = serde_json::to_value(RunRequest {
                messages: &messages,
                stream: true,
            })
            .map_err(|err| ProviderError::invalid_request(err.to_string()))?;

            self.hooks.on_request_start(ProviderId::Cloudflare, &self.model);
            let outbound = TransportRequest::new(self.endpoint(), body)
                .with_bearer_token(self.api_token.clone());
            let response = self
                .transport
                .post_stream(outbound)
                .await
                .inspect_err(|err| self.hooks.on_request_failure(ProviderId::Cloudflare, err))?;

            Ok(decode_stream(
                ProviderId::Cloudflare,
                WireFormat::EventStream,
                response,
                Arc::clone(&self.hooks),
            ))
        })
    }
}
