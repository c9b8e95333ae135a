//! Provider-agnostic chunk, message, and request context types.
//!
//! ```rust
//! use serde_json::json;
//! use vprovider::{ChatChunk, ChunkKind, HistoryMessage, RequestContext, Role};
//!
//! let chunk = ChatChunk::token("Hola");
//! assert_eq!(chunk.kind, ChunkKind::Token);
//!
//! let mut extras = serde_json::Map::new();
//! extras.insert("locale".to_string(), json!("es"));
//!
//! let context = RequestContext::merged(
//!     &[HistoryMessage::new(Role::User, "¿Quién eres?")],
//!     Some(json!({"name": "Ada"})),
//!     extras,
//! );
//! assert_eq!(context.history().len(), 1);
//! assert_eq!(context.profile(), Some(&json!({"name": "Ada"})));
//! assert_eq!(context.get("locale"), Some(&json!("es")));
//! ```

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ContextMap = serde_json::Map<String, Value>;

/// Context key carrying the conversation transcript.
pub const HISTORY_CONTEXT_KEY: &str = "conversationHistory";
/// Context key carrying the profile document.
pub const PROFILE_CONTEXT_KEY: &str = "cvProfile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Ollama,
    Cloudflare,
    Placeholder,
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::Ollama => "ollama",
            Self::Cloudflare => "cloudflare",
            Self::Placeholder => "placeholder",
        };

        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transcript entry as sent to providers: role and content only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl HistoryMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Token,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChunk {
    pub kind: ChunkKind,
    #[serde(default)]
    pub text: String,
}

impl ChatChunk {
    pub fn new(kind: ChunkKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn token(text: impl Into<String>) -> Self {
        Self::new(ChunkKind::Token, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(ChunkKind::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(ChunkKind::Error, text)
    }
}

/// Merged per-call context handed to a provider.
///
/// The map is built with object-spread semantics: history first, then the
/// profile, then caller extras, so a later key replaces an earlier one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestContext {
    values: ContextMap,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: ContextMap) -> Self {
        Self { values }
    }

    pub fn merged(history: &[HistoryMessage], profile: Option<Value>, extras: ContextMap) -> Self {
        let mut values = ContextMap::new();
        values.insert(
            HISTORY_CONTEXT_KEY.to_string(),
            Value::Array(history.iter().map(history_to_value).collect()),
        );

        if let Some(profile) = profile {
            values.insert(PROFILE_CONTEXT_KEY.to_string(), profile);
        }

        values.extend(extras);
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Profile document, treating an explicit `null` as absent.
    pub fn profile(&self) -> Option<&Value> {
        self.values
            .get(PROFILE_CONTEXT_KEY)
            .filter(|value| !value.is_null())
    }

    /// Transcript entries; elements that are not `{role, content}` objects are skipped.
    pub fn history(&self) -> Vec<HistoryMessage> {
        match self.values.get(HISTORY_CONTEXT_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Profile rendered as pretty JSON, or `{}` when absent.
    pub fn profile_text(&self) -> String {
        self.profile()
            .and_then(|profile| serde_json::to_string_pretty(profile).ok())
            .unwrap_or_else(|| "{}".to_string())
    }

    pub fn as_map(&self) -> &ContextMap {
        &self.values
    }

    pub fn into_map(self) -> ContextMap {
        self.values
    }
}

fn history_to_value(message: &HistoryMessage) -> Value {
    let mut entry = ContextMap::new();
    entry.insert("role".to_string(), Value::from(message.role.as_str()));
    entry.insert("content".to_string(), Value::from(message.content.clone()));
    Value::Object(entry)
}

/// One provider call: the user prompt plus merged context.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub prompt: String,
    pub context: RequestContext,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>, context: RequestContext) -> Self {
        Self {
            prompt: prompt.into(),
            context,
        }
    }
}
