//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use vcommon::{ConversationId, truncate_utf8};
//!
//! let conversation = ConversationId::from("conv-1");
//! assert_eq!(conversation.as_str(), "conv-1");
//! assert!(!conversation.is_blank());
//! assert_eq!(truncate_utf8("hello world", 5), "hello...");
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use vcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Conversation identifier newtype.
    //!
    //! Identifiers are opaque and always supplied by the caller.
    //!
    //! ```rust
    //! use vcommon::ConversationId;
    //!
    //! let id = ConversationId::new("conv-42");
    //! assert_eq!(id.to_string(), "conv-42");
    //! assert!(ConversationId::from("").is_empty());
    //! assert!(!ConversationId::from("   ").is_empty());
    //! assert!(ConversationId::from("   ").is_blank());
    //! ```

    use std::fmt::{Display, Formatter};

    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct ConversationId(String);

    impl ConversationId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }

        /// True only for the empty string; whitespace is a valid opaque id.
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn is_blank(&self) -> bool {
            self.0.trim().is_empty()
        }
    }

    impl Display for ConversationId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for ConversationId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for ConversationId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    impl AsRef<str> for ConversationId {
        fn as_ref(&self) -> &str {
            self.as_str()
        }
    }
}

pub mod text {
    //! Small text helpers shared by transports and stores.

    /// Truncates `input` to at most `max` bytes on a char boundary, appending `...`
    /// when anything was cut.
    pub fn truncate_utf8(input: &str, max: usize) -> String {
        if input.len() <= max {
            return input.to_string();
        }

        let mut end = max;
        while !input.is_char_boundary(end) {
            end -= 1;
        }

        let mut output = input[..end].to_string();
        output.push_str("...");
        output
    }
}

pub use context::ConversationId;
pub use future::BoxFuture;
pub use text::truncate_utf8;

#[cfg(test)]
mod tests {
    use super::{ConversationId, truncate_utf8};

    #[test]
    fn conversation_id_round_trips_strings() {
        let id = ConversationId::new("conv-1");
        let other = ConversationId::from(String::from("conv-1"));

        assert_eq!(id, other);
        assert_eq!(id.as_str(), "conv-1");
        assert_eq!(id.to_string(), "conv-1");
    }

    #[test]
    fn blank_conversation_ids_are_detected() {
        assert!(ConversationId::from("").is_blank());
        assert!(ConversationId::from(" \t").is_blank());
        assert!(!ConversationId::from("x").is_blank());
    }

    #[test]
    fn only_the_empty_string_is_empty() {
        assert!(ConversationId::from("").is_empty());
        assert!(!ConversationId::from(" ").is_empty());
        assert!(!ConversationId::from("\t").is_empty());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_utf8("short", 10), "short");
        assert_eq!(truncate_utf8("abcdef", 3), "abc...");
        // 'ó' is two bytes; cutting at 2 would split it.
        assert_eq!(truncate_utf8("aó", 2), "a...");
    }
}
