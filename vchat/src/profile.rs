//! Profile document port and its file-backed and static implementations.

use std::path::PathBuf;

use serde_json::Value;
use vcommon::BoxFuture;

use crate::ChatError;

pub const DEFAULT_PROFILE_PATH: &str = "cvProfile.json";

/// Source of the opaque grounding document injected into every request.
pub trait ProfileRepository: Send + Sync {
    fn get_profile<'a>(&'a self) -> BoxFuture<'a, Result<Value, ChatError>>;
}

/// Reads and parses a JSON file on every call, so edits apply without a restart.
#[derive(Debug, Clone)]
pub struct JsonFileProfileRepository {
    path: PathBuf,
}

impl JsonFileProfileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Default for JsonFileProfileRepository {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE_PATH)
    }
}

impl ProfileRepository for JsonFileProfileRepository {
    fn get_profile<'a>(&'a self) -> BoxFuture<'a, Result<Value, ChatError>> {
        Box::pin(async move {
            let raw = tokio::fs::read_to_string(&self.path).await.map_err(|error| {
                ChatError::profile_unavailable(format!(
                    "failed to read profile '{}': {error}",
                    self.path.display()
                ))
            })?;

            serde_json::from_str(&raw).map_err(|error| {
                ChatError::profile_unavailable(format!(
                    "failed to parse profile '{}': {error}",
                    self.path.display()
                ))
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticProfileRepository {
    profile: Value,
}

impl StaticProfileRepository {
    pub fn new(profile: Value) -> Self {
        Self { profile }
    }
}

impl ProfileRepository for StaticProfileRepository {
    fn get_profile<'a>(&'a self) -> BoxFuture<'a, Result<Value, ChatError>> {
        Box::pin(async move { Ok(self.profile.clone()) })
    }
}
