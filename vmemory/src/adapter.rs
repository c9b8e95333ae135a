//! Exposes the SQLite store through the `vchat` history capability.

use vchat::{ChatError, ConversationHistory, Message};
use vcommon::{BoxFuture, ConversationId};
use vprovider::Role;

use crate::backends::SqliteConversationHistory;
use crate::error::MemoryError;

impl ConversationHistory for SqliteConversationHistory {
    fn read<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async move {
            self.load_messages(conversation_id)
                .map_err(memory_error_to_chat_error)
        })
    }

    fn append<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        role: Role,
        content: String,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            if conversation_id.is_empty() {
                return Err(ChatError::invalid_conversation_id(
                    "conversation id must not be empty",
                ));
            }

            self.append_message(conversation_id, &Message::new(role, content))
                .map_err(memory_error_to_chat_error)
        })
    }

    fn clear<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            self.clear_conversation(conversation_id)
                .map_err(memory_error_to_chat_error)
        })
    }
}

fn memory_error_to_chat_error(error: MemoryError) -> ChatError {
    ChatError::history_store(error.to_string())
}
