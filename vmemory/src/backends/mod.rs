mod sqlite;

pub use sqlite::SqliteConversationHistory;
