//! Errors raised while assembling a runtime from configuration.

use std::error::Error;
use std::fmt::{Display, Formatter};

use vmemory::MemoryError;
use vprovider::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    Provider,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for RuntimeError {}

impl From<ProviderError> for RuntimeError {
    fn from(error: ProviderError) -> Self {
        Self::new(RuntimeErrorKind::Provider, error.to_string())
    }
}

impl From<MemoryError> for RuntimeError {
    fn from(error: MemoryError) -> Self {
        Self::new(RuntimeErrorKind::History, error.to_string())
    }
}
