//! HTTP routes: the streaming endpoint, history inspection and health.
//!
//! The stream endpoint frames the orchestrator's output as server-sent events:
//! one `meta` event, zero or more `chunk` events, then exactly one `done` or
//! `error` event.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use serde_json::{Value, json};
use vitae::{
    AgentRequest, AgentService, ContextMap, ConversationHistory, ConversationId,
    ConversationSummary, Message, Role, RuntimeBundle,
};

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub agent: AgentService,
    pub history: Arc<dyn ConversationHistory>,
}

impl AppState {
    pub fn new(agent: AgentService, history: Arc<dyn ConversationHistory>) -> Self {
        Self { agent, history }
    }
}

impl From<RuntimeBundle> for AppState {
    fn from(runtime: RuntimeBundle) -> Self {
        Self::new(runtime.agent, runtime.history)
    }
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/agent/stream", post(stream_handler))
        .route(
            "/api/agent/history/{conversation_id}",
            get(history_handler).delete(clear_history_handler),
        )
        .with_state(state)
        .route("/api", get(greeting_handler))
        .route("/health", get(health_handler))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetaPayload<'a> {
    streaming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

/// Builds an [`AgentRequest`] from a loosely typed body.
///
/// A non-string `prompt` becomes an empty prompt so validation rejects it; a
/// non-object `context` is ignored.
fn agent_request(body: &Value) -> AgentRequest {
    let prompt = body
        .get("prompt")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let context = match body.get("context") {
        Some(Value::Object(map)) => map.clone(),
        _ => ContextMap::new(),
    };

    let mut request = AgentRequest::new(prompt).with_context(context);
    if let Some(id) = body.get("conversationId").and_then(Value::as_str) {
        request = request.with_conversation_id(id);
    }
    request
}

fn json_event<T: Serialize>(name: &str, payload: &T) -> Event {
    match Event::default().event(name).json_data(payload) {
        Ok(event) => event,
        Err(error) => error_event(&error.to_string()),
    }
}

fn error_event(message: &str) -> Event {
    Event::default()
        .event("error")
        .data(json!({ "message": message }).to_string())
}

async fn stream_handler(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let request = agent_request(&body);

    let events = async_stream::stream! {
        let meta = json_event(
            "meta",
            &MetaPayload {
                streaming: true,
                conversation_id: request.conversation_id.as_ref().map(ConversationId::as_str),
            },
        );
        yield Ok::<_, Infallible>(meta);

        let mut chunks = state.agent.stream_response(request);
        let mut failure = None;
        while let Some(item) = chunks.next().await {
            match item {
                Ok(chunk) => yield Ok(json_event("chunk", &chunk)),
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }

        match failure {
            Some(error) => {
                tracing::warn!(
                    phase = "delivery",
                    event = "stream_error",
                    error_kind = ?error.kind,
                    error = %error
                );
                yield Ok(error_event(&error.message));
            }
            None => yield Ok(Event::default().event("done").data("{}")),
        }
    };

    Sse::new(events)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageBody {
    role: Role,
    content: String,
    /// Milliseconds since the Unix epoch.
    timestamp: u64,
}

impl From<&Message> for MessageBody {
    fn from(message: &Message) -> Self {
        let timestamp = message
            .timestamp
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();

        Self {
            role: message.role,
            content: message.content.clone(),
            timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryBody {
    conversation_id: String,
    message_count: usize,
    messages: Vec<MessageBody>,
}

impl From<ConversationSummary> for SummaryBody {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            conversation_id: summary.conversation_id.to_string(),
            message_count: summary.message_count,
            messages: summary.messages.iter().map(MessageBody::from).collect(),
        }
    }
}

fn conversation_id(raw: String) -> Result<ConversationId, ApiError> {
    let id = ConversationId::from(raw);
    if id.is_blank() {
        return Err(ApiError::bad_request("conversationId requerido"));
    }
    Ok(id)
}

async fn history_handler(
    State(state): State<SharedState>,
    Path(raw): Path<String>,
) -> Result<Json<SummaryBody>, ApiError> {
    let id = conversation_id(raw)?;
    let summary = state.history.summarize(&id).await?;
    Ok(Json(summary.into()))
}

async fn clear_history_handler(
    State(state): State<SharedState>,
    Path(raw): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = conversation_id(raw)?;
    state.history.clear(&id).await?;
    tracing::info!(
        phase = "delivery",
        event = "history_cleared",
        conversation_id = id.as_str()
    );

    Ok(Json(json!({
        "message": "Historial eliminado",
        "conversationId": id.as_str(),
    })))
}

async fn greeting_handler() -> Json<Value> {
    Json(json!({ "message": "Hola desde la API" }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
