use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};
use vchat::{DEFAULT_MAX_MESSAGES, Message};
use vcommon::ConversationId;
use vprovider::Role;

use crate::error::MemoryError;

/// Conversation history persisted in a single SQLite database.
///
/// Every append runs insert, trim and the `updated_at` bump in one
/// transaction, so a conversation never holds more than `max_messages` rows
/// once the transaction commits.
#[derive(Debug)]
pub struct SqliteConversationHistory {
    connection: Mutex<Connection>,
    max_messages: usize,
}

impl SqliteConversationHistory {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                MemoryError::storage(format!(
                    "failed to create sqlite parent directory: {error}"
                ))
            })?;
        }

        let connection = Connection::open(path).map_err(|error| {
            MemoryError::storage(format!("failed to open sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    pub fn new_in_memory() -> Result<Self, MemoryError> {
        let connection = Connection::open_in_memory().map_err(|error| {
            MemoryError::storage(format!("failed to open in-memory sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, MemoryError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(|error| {
                MemoryError::storage(format!("failed to configure sqlite busy timeout: {error}"))
            })?;
        let history = Self {
            connection: Mutex::new(connection),
            max_messages: DEFAULT_MAX_MESSAGES,
        };
        history.initialize_schema()?;
        Ok(history)
    }

    /// Caps each conversation; values below one are raised to one.
    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages.max(1);
        self
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, MemoryError> {
        self.connection
            .lock()
            .map_err(|_| MemoryError::storage("sqlite history lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), MemoryError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS conversations (
                conversation_id TEXT PRIMARY KEY,
                updated_at_secs INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS conversation_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at_secs INTEGER NOT NULL,
                created_at_nanos INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_conversation_messages_conversation
            ON conversation_messages(conversation_id, id);

            CREATE INDEX IF NOT EXISTS idx_conversations_updated_at
            ON conversations(updated_at_secs);
            ",
        )
        .map_err(|error| {
            MemoryError::storage(format!("failed to initialize sqlite schema: {error}"))
        })?;

        Ok(())
    }

    /// Messages in insertion order. Rows with a role this build does not know are skipped.
    pub fn load_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, MemoryError> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(
                "
                SELECT role, content, created_at_secs, created_at_nanos
                FROM conversation_messages
                WHERE conversation_id = ?1
                ORDER BY id ASC
                ",
            )
            .map_err(|error| {
                MemoryError::storage(format!("failed to prepare history query: {error}"))
            })?;
        let rows = stmt
            .query_map(params![conversation_id.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(|error| {
                MemoryError::storage(format!("failed to query history rows: {error}"))
            })?;

        let mut messages = Vec::new();
        for row in rows {
            let (role, content, secs, nanos) = row.map_err(|error| {
                MemoryError::storage(format!("failed to read history row: {error}"))
            })?;
            let Some(role) = Role::parse(&role) else {
                continue;
            };
            messages.push(Message::at(role, content, decode_system_time(secs, nanos)?));
        }
        Ok(messages)
    }

    pub fn append_message(
        &self,
        conversation_id: &ConversationId,
        message: &Message,
    ) -> Result<(), MemoryError> {
        if conversation_id.is_empty() {
            return Err(MemoryError::invalid_request(
                "conversation id must not be empty",
            ));
        }

        let (secs, nanos) = encode_system_time(message.timestamp)?;
        let mut conn = self.connection()?;
        let tx = conn.transaction().map_err(|error| {
            MemoryError::storage(format!("failed to begin history transaction: {error}"))
        })?;

        tx.execute(
            "
            INSERT INTO conversations (conversation_id, updated_at_secs)
            VALUES (?1, ?2)
            ON CONFLICT(conversation_id) DO UPDATE SET
                updated_at_secs = excluded.updated_at_secs
            ",
            params![conversation_id.as_str(), secs],
        )
        .map_err(|error| {
            MemoryError::storage(format!("failed to upsert conversation: {error}"))
        })?;

        tx.execute(
            "
            INSERT INTO conversation_messages (
                conversation_id,
                role,
                content,
                created_at_secs,
                created_at_nanos
            )
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                conversation_id.as_str(),
                message.role.as_str(),
                &message.content,
                secs,
                nanos
            ],
        )
        .map_err(|error| MemoryError::storage(format!("failed to append message: {error}")))?;

        tx.execute(
            "
            DELETE FROM conversation_messages
            WHERE conversation_id = ?1
              AND id NOT IN (
                SELECT id FROM conversation_messages
                WHERE conversation_id = ?1
                ORDER BY id DESC
                LIMIT ?2
              )
            ",
            params![conversation_id.as_str(), self.max_messages as i64],
        )
        .map_err(|error| MemoryError::storage(format!("failed to trim history: {error}")))?;

        tx.commit().map_err(|error| {
            MemoryError::storage(format!("failed to commit history transaction: {error}"))
        })
    }

    pub fn clear_conversation(&self, conversation_id: &ConversationId) -> Result<(), MemoryError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction().map_err(|error| {
            MemoryError::storage(format!("failed to begin history transaction: {error}"))
        })?;

        tx.execute(
            "DELETE FROM conversation_messages WHERE conversation_id = ?1",
            params![conversation_id.as_str()],
        )
        .map_err(|error| MemoryError::storage(format!("failed to clear messages: {error}")))?;
        tx.execute(
            "DELETE FROM conversations WHERE conversation_id = ?1",
            params![conversation_id.as_str()],
        )
        .map_err(|error| {
            MemoryError::storage(format!("failed to clear conversation: {error}"))
        })?;

        tx.commit().map_err(|error| {
            MemoryError::storage(format!("failed to commit history transaction: {error}"))
        })
    }

    /// Deletes conversations whose last append is older than `max_age`.
    /// Returns the number of conversations removed.
    pub fn purge_inactive(&self, max_age: Duration) -> Result<usize, MemoryError> {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(UNIX_EPOCH);
        let (cutoff_secs, _) = encode_system_time(cutoff)?;

        let mut conn = self.connection()?;
        let tx = conn.transaction().map_err(|error| {
            MemoryError::storage(format!("failed to begin purge transaction: {error}"))
        })?;

        tx.execute(
            "
            DELETE FROM conversation_messages
            WHERE conversation_id IN (
                SELECT conversation_id FROM conversations WHERE updated_at_secs < ?1
            )
            ",
            params![cutoff_secs],
        )
        .map_err(|error| {
            MemoryError::storage(format!("failed to purge stale messages: {error}"))
        })?;
        let purged = tx
            .execute(
                "DELETE FROM conversations WHERE updated_at_secs < ?1",
                params![cutoff_secs],
            )
            .map_err(|error| {
                MemoryError::storage(format!("failed to purge stale conversations: {error}"))
            })?;

        tx.commit().map_err(|error| {
            MemoryError::storage(format!("failed to commit purge transaction: {error}"))
        })?;
        Ok(purged)
    }

    #[cfg(test)]
    pub(crate) fn touch(&self, conversation_id: &ConversationId, updated_at_secs: i64) {
        let conn = self.connection().expect("connection");
        conn.execute(
            "UPDATE conversations SET updated_at_secs = ?2 WHERE conversation_id = ?1",
            params![conversation_id.as_str(), updated_at_secs],
        )
        .expect("touch conversation");
    }

    #[cfg(test)]
    pub(crate) fn insert_raw_role(&self, conversation_id: &ConversationId, role: &str) {
        let conn = self.connection().expect("connection");
        conn.execute(
            "
            INSERT INTO conversation_messages (
                conversation_id, role, content, created_at_secs, created_at_nanos
            )
            VALUES (?1, ?2, 'raw', 0, 0)
            ",
            params![conversation_id.as_str(), role],
        )
        .expect("insert raw row");
    }
}

fn encode_system_time(value: SystemTime) -> Result<(i64, i64), MemoryError> {
    let duration = value.duration_since(UNIX_EPOCH).map_err(|error| {
        MemoryError::invalid_request(format!("timestamp predates unix epoch: {error}"))
    })?;
    Ok((
        duration.as_secs() as i64,
        i64::from(duration.subsec_nanos()),
    ))
}

fn decode_system_time(seconds: i64, nanos: i64) -> Result<SystemTime, MemoryError> {
    if seconds < 0 {
        return Err(MemoryError::storage(format!(
            "timestamp seconds must be non-negative, got {seconds}"
        )));
    }
    if !(0..1_000_000_000).contains(&nanos) {
        return Err(MemoryError::storage(format!(
            "timestamp nanos must be in [0, 1_000_000_000), got {nanos}"
        )));
    }
    Ok(UNIX_EPOCH + Duration::new(seconds as u64, nanos as u32))
}
