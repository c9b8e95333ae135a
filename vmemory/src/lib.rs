//! Durable conversation history backed by SQLite.
//!
//! ```rust
//! use vchat::ConversationHistory;
//! use vcommon::ConversationId;
//! use vmemory::SqliteConversationHistory;
//! use vprovider::Role;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let history = SqliteConversationHistory::new_in_memory()?.with_max_messages(10);
//! let id = ConversationId::from("conv-1");
//! history.append(&id, Role::User, "Hola".to_string()).await?;
//! assert_eq!(history.read(&id).await?.len(), 1);
//! # Ok(())
//! # }
//! ```

mod adapter;
mod backends;
mod error;

pub mod prelude {
    pub use crate::{MemoryError, MemoryErrorKind, SqliteConversationHistory};
}

pub use backends::SqliteConversationHistory;
pub use error::{MemoryError, MemoryErrorKind};

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use vchat::{ChatErrorKind, ConversationHistory, Message};
    use vcommon::ConversationId;
    use vprovider::Role;

    use crate::{MemoryErrorKind, SqliteConversationHistory};

    fn temp_db(prefix: &str) -> std::path::PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir()
            .join(format!("vmemory-{prefix}-{unique}"))
            .join("history.sqlite3")
    }

    #[tokio::test]
    async fn sqlite_history_honors_history_contract() {
        let make = || {
            Arc::new(
                SqliteConversationHistory::new_in_memory()
                    .expect("sqlite should open")
                    .with_max_messages(4),
            ) as Arc<dyn ConversationHistory>
        };
        vchat::contract::run_all(make, 4).await;
    }

    #[tokio::test]
    async fn history_survives_reopening_the_database() {
        let path = temp_db("reopen");
        let id = ConversationId::from("conv-persist");

        {
            let history = SqliteConversationHistory::new(&path).expect("sqlite should open");
            history
                .append(&id, Role::User, "Hola".to_string())
                .await
                .expect("append");
            history
                .append(&id, Role::Assistant, "Buenas".to_string())
                .await
                .expect("append");
        }

        let reopened = SqliteConversationHistory::new(&path).expect("sqlite should reopen");
        let messages = reopened.read(&id).await.expect("read");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Buenas");

        if let Some(parent) = path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[tokio::test]
    async fn timestamps_round_trip_with_nanosecond_precision() {
        let history = SqliteConversationHistory::new_in_memory().expect("sqlite should open");
        let id = ConversationId::from("conv-time");
        let timestamp = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);

        history
            .append_message(&id, &Message::at(Role::User, "hola", timestamp))
            .expect("append");

        let messages = history.load_messages(&id).expect("load");
        assert_eq!(messages[0].timestamp, timestamp);
    }

    #[tokio::test]
    async fn empty_ids_are_rejected_at_both_layers() {
        let history = SqliteConversationHistory::new_in_memory().expect("sqlite should open");
        let empty = ConversationId::from("");

        let direct = history
            .append_message(&empty, &Message::new(Role::User, "x"))
            .expect_err("empty id");
        assert_eq!(direct.kind, MemoryErrorKind::InvalidRequest);

        let through_capability = history
            .append(&empty, Role::User, "x".to_string())
            .await
            .expect_err("empty id");
        assert_eq!(through_capability.kind, ChatErrorKind::InvalidConversationId);
    }

    #[tokio::test]
    async fn whitespace_ids_are_stored_verbatim() {
        let history = SqliteConversationHistory::new_in_memory().expect("sqlite should open");
        let spaced = ConversationId::from("  ");

        history
            .append(&spaced, Role::User, "x".to_string())
            .await
            .expect("whitespace id should be accepted");

        let messages = history.read(&spaced).await.expect("read");
        assert_eq!(messages.len(), 1);
        assert!(history
            .read(&ConversationId::from(" "))
            .await
            .expect("read")
            .is_empty());
    }

    #[tokio::test]
    async fn purge_removes_only_inactive_conversations() {
        let history = SqliteConversationHistory::new_in_memory().expect("sqlite should open");
        let stale = ConversationId::from("conv-stale");
        let fresh = ConversationId::from("conv-fresh");

        for id in [&stale, &fresh] {
            history
                .append(id, Role::User, "hola".to_string())
                .await
                .expect("append");
        }
        history.touch(&stale, 1_000);

        let purged = history
            .purge_inactive(Duration::from_secs(30 * 24 * 60 * 60))
            .expect("purge");

        assert_eq!(purged, 1);
        assert!(history.read(&stale).await.expect("read").is_empty());
        assert_eq!(history.read(&fresh).await.expect("read").len(), 1);
    }

    #[tokio::test]
    async fn unknown_roles_in_stored_rows_are_skipped() {
        let history = SqliteConversationHistory::new_in_memory().expect("sqlite should open");
        let id = ConversationId::from("conv-roles");
        history
            .append(&id, Role::User, "hola".to_string())
            .await
            .expect("append");
        history.insert_raw_role(&id, "tool");

        let messages = history.read(&id).await.expect("read");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
    }
}
