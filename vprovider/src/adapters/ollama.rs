//! Local inference provider speaking the Ollama `/api/generate` protocol.
//!
//! The preamble, profile, transcript and question are flattened into a single
//! prompt; the response is one JSON object per line.

use std::sync::Arc;

use serde::Serialize;

use crate::decode::{WireFormat, decode_stream};
use crate::{
    ChatProvider, ChatRequest, ChunkStream, NoopStreamHooks, Preamble, PreambleSource,
    ProviderError, ProviderFuture, ProviderId, ProviderStreamHooks, RequestContext, Role,
    StreamTransport, TransportRequest,
};

pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const OLLAMA_DEFAULT_MODEL: &str = "ai/llama3.2:latest";

#[derive(Clone)]
pub struct OllamaProvider {
    transport: Arc<dyn StreamTransport>,
    base_url: String,
    model: String,
    preamble: Arc<Preamble>,
    hooks: Arc<dyn ProviderStreamHooks>,
}

impl OllamaProvider {
    pub fn new(transport: Arc<dyn StreamTransport>) -> Self {
        Self {
            transport,
            base_url: OLLAMA_BASE_URL.to_string(),
            model: OLLAMA_DEFAULT_MODEL.to_string(),
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
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    pub fn preamble_loaded(&self) -> bool {
        self.preamble.is_loaded()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Flattens preamble, profile, transcript and question into one prompt.
pub fn render_prompt(preamble: &str, prompt: &str, context: &RequestContext) -> String {
    let mut rendered = format!("{preamble}\n\n### DATOS DEL CV:\n{}", context.profile_text());

    let history = context.history();
    if !history.is_empty() {
        rendered.push_str("\n\n### HISTORIAL DE CONVERSACIÓN:\n");
        for message in &history {
            let speaker = match message.role {
                Role::User => "Usuario",
                Role::Assistant | Role::System => "Asistente",
            };
            rendered.push_str(speaker);
            rendered.push_str(": ");
            rendered.push_str(&message.content);
            rendered.push('\n');
        }
    }

    rendered.push_str("\n\n### PREGUNTA DEL USUARIO:\n");
    rendered.push_str(prompt);
    rendered
}

impl ChatProvider for OllamaProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    fn stream_chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            let preamble = self.preamble.load(ProviderId::Ollama, self.hooks.as_ref()).await;
            let prompt = render_prompt(preamble, &request.prompt, &request.context);
            let body = serde_json::to_value(GenerateRequest {
                model: &self.model,
                prompt: &prompt,
                stream: true,
            })
            .map_err(|err| ProviderError::invalid_request(err.to_string()))?;

            self.hooks.on_request_start(ProviderId::Ollama, &self.model);
            let response = self
                .transport
                .post_stream(TransportRequest::new(self.endpoint(), body))
                .await
                .inspect_err(|err| self.hooks.on_request_failure(ProviderId::Ollama, err))?;

            Ok(decode_stream(
                ProviderId::Ollama,
                WireFormat::Ndjson,
                response,
                Arc::clone(&self.hooks),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ContextMap, HistoryMessage};

    #[test]
    fn render_prompt_without_history_omits_transcript_block() {
        let rendered = render_prompt("Preambulo", "¿Quién eres?", &RequestContext::new());
        assert_eq!(
            rendered,
            "Preambulo\n\n### DATOS DEL CV:\n{}\n\n### PREGUNTA DEL USUARIO:\n¿Quién eres?"
        );
    }

    #[test]
    fn render_prompt_labels_speakers_and_embeds_profile() {
        let context = RequestContext::merged(
            &[
                HistoryMessage::new(Role::User, "Hola"),
                HistoryMessage::new(Role::Assistant, "Buenas"),
            ],
            Some(json!({"name": "Ada"})),
            ContextMap::new(),
        );

        let rendered = render_prompt("P", "¿Experiencia?", &context);
        assert_eq!(
            rendered,
            "P\n\n### DATOS DEL CV:\n{\n  \"name\": \"Ada\"\n}\n\n### HISTORIAL DE CONVERSACIÓN:\nUsuario: Hola\nAsistente: Buenas\n\n\n### PREGUNTA DEL USUARIO:\n¿Experiencia?"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        #[derive(Debug)]
        struct NeverTransport;

        impl StreamTransport for NeverTransport {
            fn post_stream<'a>(
                &'a self,
                _request: TransportRequest,
            ) -> ProviderFuture<'a, Result<crate::ByteStream<'a>, ProviderError>> {
                Box::pin(async { Err(ProviderError::other("unused")) })
            }
        }

        let provider =
            OllamaProvider::new(Arc::new(NeverTransport)).with_base_url("http://gpu-box:11434/");
        assert_eq!(provider.endpoint(), "http://gpu-box:11434/api/generate");
        assert_eq!(provider.model(), OLLAMA_DEFAULT_MODEL);
    }
}
