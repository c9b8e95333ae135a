//! Runtime wiring: provider, history store, profile source and hooks
//! assembled into one [`AgentService`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use vchat::{
    AgentHooks, AgentService, ConversationHistory, DEFAULT_MAX_MESSAGES,
    InMemoryConversationHistory, JsonFileProfileRepository, NoopAgentHooks, ProfileRepository,
};
use vmemory::{MemoryError, SqliteConversationHistory};
use vobserve::{
    CompositeAgentHooks, CompositeStreamHooks, MetricsObservabilityHooks, SafeAgentHooks,
    SafeStreamHooks, TracingObservabilityHooks,
};
use vprovider::{ChatProvider, NoopStreamHooks, ProviderStreamHooks};

use crate::{ProviderConfig, RuntimeError, build_provider};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryConfig {
    InMemory {
        max_messages: usize,
    },
    Sqlite {
        path: PathBuf,
        max_messages: usize,
        /// Conversations idle for longer than this are purged when the store opens.
        retention: Option<Duration>,
    },
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::InMemory {
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub provider: ProviderConfig,
    pub history: HistoryConfig,
    pub profile_path: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl RuntimeConfig {
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            history: HistoryConfig::default(),
            profile_path: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    pub fn with_profile_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_path = Some(path.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Hook pair threaded through the provider and the orchestrator.
#[derive(Clone)]
pub struct RuntimeHooks {
    pub stream: Arc<dyn ProviderStreamHooks>,
    pub agent: Arc<dyn AgentHooks>,
}

impl RuntimeHooks {
    pub fn noop() -> Self {
        Self {
            stream: Arc::new(NoopStreamHooks),
            agent: Arc::new(NoopAgentHooks),
        }
    }

    /// Structured `tracing` events, isolated from panics in the subscriber.
    pub fn tracing() -> Self {
        Self {
            stream: Arc::new(SafeStreamHooks::new(TracingObservabilityHooks)),
            agent: Arc::new(SafeAgentHooks::new(TracingObservabilityHooks)),
        }
    }

    /// Tracing events plus `metrics` counters, each side isolated from the other's panics.
    pub fn tracing_and_metrics() -> Self {
        Self {
            stream: Arc::new(CompositeStreamHooks::new(
                SafeStreamHooks::new(TracingObservabilityHooks),
                SafeStreamHooks::new(MetricsObservabilityHooks),
            )),
            agent: Arc::new(CompositeAgentHooks::new(
                SafeAgentHooks::new(TracingObservabilityHooks),
                SafeAgentHooks::new(MetricsObservabilityHooks),
            )),
        }
    }
}

impl Default for RuntimeHooks {
    fn default() -> Self {
        Self::noop()
    }
}

#[derive(Clone)]
pub struct RuntimeBundle {
    pub agent: AgentService,
    pub history: Arc<dyn ConversationHistory>,
    /// Conversations removed by the retention purge when the store opened.
    pub purged_conversations: usize,
}

/// Opens the configured history store, running the retention purge for durable stores.
pub fn open_history(
    config: &HistoryConfig,
) -> Result<(Arc<dyn ConversationHistory>, usize), MemoryError> {
    match config {
        HistoryConfig::InMemory { max_messages } => Ok((
            Arc::new(InMemoryConversationHistory::new().with_max_messages(*max_messages)),
            0,
        )),
        HistoryConfig::Sqlite {
            path,
            max_messages,
            retention,
        } => {
            let store = SqliteConversationHistory::new(path)?.with_max_messages(*max_messages);
            let purged = match retention {
                Some(max_age) => store.purge_inactive(*max_age)?,
                None => 0,
            };
            Ok((Arc::new(store), purged))
        }
    }
}

pub fn build_runtime(config: &RuntimeConfig) -> Result<RuntimeBundle, RuntimeError> {
    build_runtime_with_hooks(config, RuntimeHooks::noop())
}

pub fn build_runtime_with_hooks(
    config: &RuntimeConfig,
    hooks: RuntimeHooks,
) -> Result<RuntimeBundle, RuntimeError> {
    let provider = build_provider(
        &config.provider,
        config.request_timeout,
        Arc::clone(&hooks.stream),
    )?;
    let (history, purged_conversations) = open_history(&config.history)?;
    let profile = config.profile_path.as_ref().map(|path| {
        Arc::new(JsonFileProfileRepository::new(path.clone())) as Arc<dyn ProfileRepository>
    });

    let mut bundle = build_runtime_with(provider, history, profile, hooks.agent);
    bundle.purged_conversations = purged_conversations;
    Ok(bundle)
}

pub fn build_runtime_with(
    provider: Arc<dyn ChatProvider>,
    history: Arc<dyn ConversationHistory>,
    profile: Option<Arc<dyn ProfileRepository>>,
    hooks: Arc<dyn AgentHooks>,
) -> RuntimeBundle {
    let mut builder = AgentService::builder(provider)
        .history(Arc::clone(&history))
        .hooks(hooks);
    if let Some(profile) = profile {
        builder = builder.profile(profile);
    }

    RuntimeBundle {
        agent: builder.build(),
        history,
        purged_conversations: 0,
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use futures_util::StreamExt;

    use super::*;
    use crate::{AgentRequest, ChunkKind, ConversationId, PLACEHOLDER_NOTICE, Role, SecretString};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("vitae-runtime-{name}-{nanos}"))
    }

    #[tokio::test]
    async fn placeholder_runtime_streams_notice_and_records_turn() {
        let runtime = build_runtime(&RuntimeConfig::new(ProviderConfig::Placeholder))
            .expect("runtime should build");
        let request = AgentRequest::new("¿Quién eres?").with_conversation_id("conv-1");

        let chunks: Vec<_> = runtime.agent.stream_response(request).collect().await;
        assert_eq!(chunks.len(), 1);
        let chunk = chunks[0].as_ref().expect("chunk should be ok");
        assert_eq!(chunk.kind, ChunkKind::Info);
        assert_eq!(chunk.text, PLACEHOLDER_NOTICE);

        let stored = runtime
            .history
            .read(&ConversationId::from("conv-1"))
            .await
            .expect("history should read");
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].role, Role::User);
        assert_eq!(stored[1].role, Role::Assistant);
        assert_eq!(stored[1].content, PLACEHOLDER_NOTICE);
    }

    #[tokio::test]
    async fn sqlite_history_is_opened_with_configured_cap() {
        let dir = temp_path("sqlite");
        let config = RuntimeConfig::new(ProviderConfig::Placeholder).with_history(
            HistoryConfig::Sqlite {
                path: dir.join("history.db"),
                max_messages: 1,
                retention: Some(Duration::from_secs(60)),
            },
        );

        let runtime = build_runtime(&config).expect("runtime should build");
        assert_eq!(runtime.purged_conversations, 0);

        let request = AgentRequest::new("Hola").with_conversation_id("conv-1");
        let _chunks: Vec<_> = runtime.agent.stream_response(request).collect().await;

        let stored = runtime
            .history
            .read(&ConversationId::from("conv-1"))
            .await
            .expect("history should read");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].role, Role::Assistant);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn cloud_runtime_without_token_fails_as_provider_error() {
        let config = RuntimeConfig::new(ProviderConfig::cloud("acct", SecretString::new("")));
        let err = build_runtime(&config).err().expect("build should fail");
        assert_eq!(err.kind, crate::RuntimeErrorKind::Provider);
    }

    #[tokio::test]
    async fn missing_profile_file_aborts_turn() {
        let config = RuntimeConfig::new(ProviderConfig::Placeholder)
            .with_profile_path(temp_path("missing-profile.json"));
        let runtime = build_runtime_with_hooks(&config, RuntimeHooks::tracing())
            .expect("runtime should build");

        let chunks: Vec<_> = runtime
            .agent
            .stream_response(AgentRequest::new("Hola"))
            .collect()
            .await;
        assert_eq!(chunks.len(), 1);
        let err = chunks[0].as_ref().err().expect("turn should fail");
        assert_eq!(err.kind, crate::ChatErrorKind::ProfileUnavailable);
    }

    #[tokio::test]
    async fn tracing_and_metrics_hooks_observe_a_full_turn() {
        let runtime = build_runtime_with_hooks(
            &RuntimeConfig::new(ProviderConfig::Placeholder),
            RuntimeHooks::tracing_and_metrics(),
        )
        .expect("runtime should build");

        let chunks: Vec<_> = runtime
            .agent
            .stream_response(AgentRequest::new("Hola").with_conversation_id("conv-1"))
            .collect()
            .await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].as_ref().expect("chunk should be ok").text,
            PLACEHOLDER_NOTICE
        );
    }
}
