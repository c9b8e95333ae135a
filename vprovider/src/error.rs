//! Shared provider error kinds and error value helpers.
//!
//! ```rust
//! use vprovider::{ProviderError, ProviderErrorKind};
//!
//! let err = ProviderError::http_status(503, "overloaded");
//! assert_eq!(err.kind, ProviderErrorKind::Unavailable);
//! assert_eq!(err.status, Some(503));
//! assert_eq!(err.body.as_deref(), Some("overloaded"));
//! assert!(err.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use vcommon::truncate_utf8;

/// Maximum number of response-body bytes kept on an HTTP error.
pub const MAX_ERROR_BODY_BYTES: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            status: None,
            body: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Authentication, message, false)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message, true)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message, true)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message, false)
    }

    /// Error for a remote that answered with a non-success status.
    pub fn http_status(status: u16, body: &str) -> Self {
        let body = truncate_utf8(body, MAX_ERROR_BODY_BYTES);
        let message = if body.is_empty() {
            format!("http {status}")
        } else {
            format!("http {status}: {body}")
        };

        let base = match status {
            401 | 403 => Self::authentication(message),
            408 | 504 => Self::timeout(message),
            400 | 404 | 422 => Self::invalid_request(message),
            502 | 503 => Self::unavailable(message),
            _ => Self::transport(message),
        };

        Self {
            status: Some(status),
            body: Some(body),
            ..base
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status.is_some()
            || matches!(
                self.kind,
                ProviderErrorKind::Transport | ProviderErrorKind::Timeout
            )
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ProviderError {}
