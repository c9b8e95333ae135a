use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_util::StreamExt;
use serde_json::json;
use vprovider::{
    ByteStream, ChatChunk, ChatProvider, ChatRequest, CloudflareProvider, ContextMap,
    HistoryMessage, ParseWarning, PreambleSource, ProviderError, ProviderErrorKind,
    ProviderFuture, ProviderId, ProviderStreamHooks, RequestContext, Role, SecretString,
    StreamTransport, TransportRequest,
};

#[derive(Debug, Default)]
struct FakeTransport {
    body: Vec<&'static str>,
    fail_with: Option<ProviderError>,
    captured: Mutex<Option<TransportRequest>>,
}

impl FakeTransport {
    fn with_body(body: Vec<&'static str>) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    fn captured(&self) -> TransportRequest {
        self.captured
            .lock()
            .expect("captured lock")
            .clone()
            .expect("a request should have been sent")
    }
}

impl StreamTransport for FakeTransport {
    fn post_stream<'a>(
        &'a self,
        request: TransportRequest,
    ) -> ProviderFuture<'a, Result<ByteStream<'a>, ProviderError>> {
        Box::pin(async move {
            *self.captured.lock().expect("captured lock") = Some(request);
            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }

            let parts = self
                .body
                .iter()
                .map(|part| Ok(Bytes::from_static(part.as_bytes())))
                .collect::<Vec<_>>();
            let body: ByteStream<'a> = Box::pin(futures_util::stream::iter(parts));
            Ok(body)
        })
    }
}

#[derive(Default)]
struct RecordingHooks {
    warnings: Mutex<Vec<ParseWarning>>,
    failures: Mutex<Vec<ProviderErrorKind>>,
}

impl ProviderStreamHooks for RecordingHooks {
    fn on_request_failure(&self, _provider: ProviderId, error: &ProviderError) {
        self.failures.lock().expect("failures lock").push(error.kind);
    }

    fn on_parse_warning(&self, warning: &ParseWarning) {
        self.warnings
            .lock()
            .expect("warnings lock")
            .push(warning.clone());
    }
}

fn provider(transport: Arc<FakeTransport>, hooks: Arc<RecordingHooks>) -> CloudflareProvider {
    CloudflareProvider::new(transport, "acct-123", SecretString::new("cf-token"))
        .with_preamble(PreambleSource::Inline("Eres un asistente.".to_string()))
        .with_hooks(hooks)
}

async fn collect(provider: &CloudflareProvider) -> Vec<Result<ChatChunk, ProviderError>> {
    let stream = provider
        .stream_chat(ChatRequest::new("Hola", RequestContext::new()))
        .await
        .expect("stream should open");
    stream.collect().await
}

#[tokio::test]
async fn done_sentinel_ends_stream_without_chunks_or_errors() {
    let transport = Arc::new(FakeTransport::with_body(vec!["data: DONE\n\n"]));
    let hooks = Arc::new(RecordingHooks::default());

    let chunks = collect(&provider(transport, hooks.clone())).await;

    assert!(chunks.is_empty());
    assert!(hooks.warnings.lock().expect("warnings lock").is_empty());
    assert!(hooks.failures.lock().expect("failures lock").is_empty());
}

#[tokio::test]
async fn frames_split_across_reads_are_reassembled_and_bracketed_done_stops_reading() {
    let transport = Arc::new(FakeTransport::with_body(vec![
        ": keep-alive\n\ndata: {\"resp",
        "onse\":\"Hola\"}\n\ndata: {\"response\":\" mundo\"}\r\n\r\n",
        "data: {\"delta\":{\"content\":\"!\"}}\n\ndata: [DONE]\n\n",
        "data: {\"response\":\"ignored\"}\n\n",
    ]));
    let hooks = Arc::new(RecordingHooks::default());

    let chunks = collect(&provider(transport, hooks.clone())).await;

    assert_eq!(
        chunks,
        vec![
            Ok(ChatChunk::token("Hola")),
            Ok(ChatChunk::token(" mundo")),
            Ok(ChatChunk::token("!")),
        ]
    );
    assert!(hooks.warnings.lock().expect("warnings lock").is_empty());
}

#[tokio::test]
async fn malformed_frames_are_skipped_with_a_warning() {
    let transport = Arc::new(FakeTransport::with_body(vec![
        "data: {broken\n\n",
        "data: {\"response\":\"ok\"}\n\n",
        "data: DONE\n\n",
    ]));
    let hooks = Arc::new(RecordingHooks::default());

    let chunks = collect(&provider(transport, hooks.clone())).await;

    assert_eq!(chunks, vec![Ok(ChatChunk::token("ok"))]);
    let warnings = hooks.warnings.lock().expect("warnings lock");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].provider, ProviderId::Cloudflare);
    assert_eq!(warnings[0].payload, "data: {broken");
}

#[tokio::test]
async fn request_uses_account_model_path_bearer_token_and_message_list() {
    let transport = Arc::new(FakeTransport::with_body(vec!["data: DONE\n\n"]));
    let hooks = Arc::new(RecordingHooks::default());
    let provider = provider(transport.clone(), hooks).with_model("@cf/meta/llama-3.1-8b-instruct");

    let context = RequestContext::merged(
        &[
            HistoryMessage::new(Role::User, "Mensaje anterior"),
            HistoryMessage::new(Role::Assistant, "Respuesta anterior"),
        ],
        None,
        ContextMap::new(),
    );
    let stream = provider
        .stream_chat(ChatRequest::new("Nuevo mensaje", context))
        .await
        .expect("stream should open");
    let _ = stream.collect::<Vec<_>>().await;

    let request = transport.captured();
    assert_eq!(
        request.url,
        "https://api.cloudflare.com/client/v4/accounts/acct-123/ai/run/@cf/meta/llama-3.1-8b-instruct"
    );
    assert_eq!(
        request.bearer_token.as_ref().map(SecretString::expose),
        Some("cf-token")
    );
    assert_eq!(
        request.body,
        json!({
            "messages": [
                {"role": "system", "content": "Eres un asistente.\n\n### DATOS DEL CV:\n{}"},
                {"role": "user", "content": "Mensaje anterior"},
                {"role": "assistant", "content": "Respuesta anterior"},
                {"role": "user", "content": "Nuevo mensaje"}
            ],
            "stream": true
        })
    );
}

#[tokio::test]
async fn unauthorized_response_surfaces_as_authentication_error() {
    let transport = Arc::new(FakeTransport {
        fail_with: Some(ProviderError::http_status(401, "{\"errors\":[\"bad token\"]}")),
        ..FakeTransport::default()
    });
    let hooks = Arc::new(RecordingHooks::default());
    let provider = provider(transport, hooks.clone());

    let error = match provider
        .stream_chat(ChatRequest::new("Hola", RequestContext::new()))
        .await
    {
        Ok(_) => panic!("stream should not open"),
        Err(error) => error,
    };

    assert_eq!(error.kind, ProviderErrorKind::Authentication);
    assert_eq!(error.status, Some(401));
    assert_eq!(
        *hooks.failures.lock().expect("failures lock"),
        vec![ProviderErrorKind::Authentication]
    );
}
