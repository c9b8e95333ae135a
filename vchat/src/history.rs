//! Conversation history capability and the in-process implementation.
//!
//! ```rust
//! use vchat::{ConversationHistory, InMemoryConversationHistory};
//! use vcommon::ConversationId;
//! use vprovider::Role;
//!
//! # async fn run() -> Result<(), vchat::ChatError> {
//! let history = InMemoryConversationHistory::new().with_max_messages(2);
//! let id = ConversationId::from("conv-1");
//!
//! for content in ["uno", "dos", "tres"] {
//!     history.append(&id, Role::User, content.to_string()).await?;
//! }
//!
//! let kept = history.read(&id).await?;
//! assert_eq!(kept.len(), 2);
//! assert_eq!(kept[0].content, "dos");
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::SystemTime;

use vcommon::{BoxFuture, ConversationId};
use vprovider::{HistoryMessage, Role};

use crate::ChatError;

pub const DEFAULT_MAX_MESSAGES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: SystemTime,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self::at(role, content, SystemTime::now())
    }

    pub fn at(role: Role, content: impl Into<String>, timestamp: SystemTime) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn to_history(&self) -> HistoryMessage {
        HistoryMessage::new(self.role, self.content.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub conversation_id: ConversationId,
    pub message_count: usize,
    pub messages: Vec<Message>,
}

impl ConversationSummary {
    pub fn new(conversation_id: ConversationId, messages: Vec<Message>) -> Self {
        Self {
            conversation_id,
            message_count: messages.len(),
            messages,
        }
    }
}

/// Bounded, append-only message log keyed by conversation.
///
/// `read` returns an empty list for unknown identifiers; its error path is
/// reserved for an unreachable store. `append` rejects blank identifiers and
/// trims the log to the newest `max_messages` entries atomically per
/// identifier. `clear` is idempotent.
pub trait ConversationHistory: Send + Sync {
    fn read<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>>;

    fn append<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        role: Role,
        content: String,
    ) -> BoxFuture<'a, Result<(), ChatError>>;

    fn clear<'a>(&'a self, conversation_id: &'a ConversationId)
    -> BoxFuture<'a, Result<(), ChatError>>;

    fn summarize<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<ConversationSummary, ChatError>> {
        Box::pin(async move {
            let messages = self.read(conversation_id).await?;
            Ok(ConversationSummary::new(conversation_id.clone(), messages))
        })
    }
}

pub(crate) fn ensure_conversation_id(conversation_id: &ConversationId) -> Result<(), ChatError> {
    if conversation_id.is_empty() {
        return Err(ChatError::invalid_conversation_id(
            "conversation id must not be empty",
        ));
    }

    Ok(())
}

#[derive(Debug)]
pub struct InMemoryConversationHistory {
    max_messages: usize,
    conversations: Mutex<HashMap<ConversationId, VecDeque<Message>>>,
}

impl Default for InMemoryConversationHistory {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            conversations: Mutex::new(HashMap::new()),
        }
    }
}

impl InMemoryConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps each conversation; values below one are raised to one.
    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages.max(1);
        self
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    fn conversations(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ConversationId, VecDeque<Message>>>, ChatError>
    {
        self.conversations
            .lock()
            .map_err(|_| ChatError::history_store("conversation history lock poisoned"))
    }
}

impl ConversationHistory for InMemoryConversationHistory {
    fn read<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async move {
            let conversations = self.conversations()?;
            Ok(conversations
                .get(conversation_id)
                .map(|messages| messages.iter().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn append<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        role: Role,
        content: String,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            ensure_conversation_id(conversation_id)?;

            let mut conversations = self.conversations()?;
            let messages = conversations.entry(conversation_id.clone()).or_default();
            messages.push_back(Message::new(role, content));
            while messages.len() > self.max_messages {
                messages.pop_front();
            }

            Ok(())
        })
    }

    fn clear<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            self.conversations()?.remove(conversation_id);
            Ok(())
        })
    }
}
