//! Agent response orchestration: validate, gather context, stream, record.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use serde_json::Value;
use vcommon::ConversationId;
use vprovider::{
    ChatChunk, ChatProvider, ChatRequest, ContextMap, HistoryMessage, RequestContext, Role,
};

use crate::{
    AgentHooks, AgentPhase, ChatError, ChatErrorPhase, ConversationHistory, NoopAgentHooks,
    ProfileRepository,
};

pub type ChatEventStream<'a> = Pin<Box<dyn Stream<Item = Result<ChatChunk, ChatError>> + Send + 'a>>;

/// One inbound prompt with caller extras and an optional conversation scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentRequest {
    pub prompt: String,
    pub context: ContextMap,
    pub conversation_id: Option<ConversationId>,
}

impl AgentRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = context;
        self
    }

    pub fn with_conversation_id(mut self, conversation_id: impl Into<ConversationId>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

#[derive(Clone)]
pub struct AgentService {
    provider: Arc<dyn ChatProvider>,
    history: Option<Arc<dyn ConversationHistory>>,
    profile: Option<Arc<dyn ProfileRepository>>,
    hooks: Arc<dyn AgentHooks>,
}

pub struct AgentServiceBuilder {
    provider: Arc<dyn ChatProvider>,
    history: Option<Arc<dyn ConversationHistory>>,
    profile: Option<Arc<dyn ProfileRepository>>,
    hooks: Arc<dyn AgentHooks>,
}

impl AgentServiceBuilder {
    pub fn history(mut self, history: Arc<dyn ConversationHistory>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn profile(mut self, profile: Arc<dyn ProfileRepository>) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn AgentHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> AgentService {
        AgentService {
            provider: self.provider,
            history: self.history,
            profile: self.profile,
            hooks: self.hooks,
        }
    }
}

impl AgentService {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self::builder(provider).build()
    }

    pub fn builder(provider: Arc<dyn ChatProvider>) -> AgentServiceBuilder {
        AgentServiceBuilder {
            provider,
            history: None,
            profile: None,
            hooks: Arc::new(NoopAgentHooks),
        }
    }

    pub fn provider(&self) -> &Arc<dyn ChatProvider> {
        &self.provider
    }

    pub fn history(&self) -> Option<&Arc<dyn ConversationHistory>> {
        self.history.as_ref()
    }

    /// Streams the assistant answer for `request`.
    ///
    /// Nothing runs until the stream is first polled; validation, history and
    /// profile failures are the stream's first and only item. Chunks are
    /// relayed as the provider produces them. The assistant message is
    /// recorded after the provider finishes, and a failure to record it ends
    /// the stream with an error after every chunk has been delivered.
    pub fn stream_response<'a>(&'a self, request: AgentRequest) -> ChatEventStream<'a> {
        Box::pin(try_stream! {
            let AgentRequest {
                prompt,
                context,
                conversation_id,
            } = request;
            // An empty id means "no conversation", matching an omitted one.
            let conversation = conversation_id.filter(|id| !id.is_empty());
            let hooks = Arc::clone(&self.hooks);
            let fail = |error: &ChatError| hooks.on_turn_failure(conversation.as_ref(), error);

            let context = self
                .prepare(&prompt, conversation.as_ref(), context)
                .await
                .inspect_err(fail)?;

            self.hooks.on_phase_start(AgentPhase::Stream, conversation.as_ref());
            let mut chunks = self
                .provider
                .stream_chat(ChatRequest::new(prompt, context))
                .await
                .map_err(ChatError::from)
                .inspect_err(fail)?;

            let mut full_response = String::new();
            let mut relayed = 0usize;
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk.map_err(ChatError::from).inspect_err(fail)?;
                full_response.push_str(&chunk.text);
                relayed += 1;
                yield chunk;
            }
            drop(chunks);

            if let (Some(id), Some(history)) = (conversation.as_ref(), self.history.as_ref()) {
                if !full_response.is_empty() {
                    self.hooks
                        .on_phase_start(AgentPhase::RecordAssistantMessage, Some(id));
                    history
                        .append(id, Role::Assistant, full_response.clone())
                        .await
                        .map_err(|error| error.with_phase(ChatErrorPhase::Persistence))
                        .inspect_err(fail)?;
                }
            }

            self.hooks.on_turn_complete(
                conversation.as_ref(),
                relayed,
                full_response.chars().count(),
            );
        })
    }

    async fn prepare(
        &self,
        prompt: &str,
        conversation: Option<&ConversationId>,
        extras: ContextMap,
    ) -> Result<RequestContext, ChatError> {
        self.hooks.on_phase_start(AgentPhase::Validate, conversation);
        if prompt.is_empty() {
            return Err(ChatError::invalid_prompt("prompt must be a non-empty string"));
        }

        let mut prior = Vec::<HistoryMessage>::new();
        if let (Some(id), Some(history)) = (conversation, self.history.as_ref()) {
            self.hooks.on_phase_start(AgentPhase::FetchHistory, conversation);
            prior = history
                .read(id)
                .await
                .map_err(|error| error.with_phase(ChatErrorPhase::History))?
                .iter()
                .map(|message| message.to_history())
                .collect();
        }

        let mut profile = None::<Value>;
        if let Some(repository) = &self.profile {
            self.hooks.on_phase_start(AgentPhase::LoadProfile, conversation);
            profile = Some(
                repository
                    .get_profile()
                    .await
                    .map_err(|error| error.with_phase(ChatErrorPhase::Profile))?,
            );
        }

        if let (Some(id), Some(history)) = (conversation, self.history.as_ref()) {
            self.hooks
                .on_phase_start(AgentPhase::RecordUserMessage, conversation);
            history
                .append(id, Role::User, prompt.to_string())
                .await
                .map_err(|error| error.with_phase(ChatErrorPhase::Persistence))?;
        }

        Ok(RequestContext::merged(&prior, profile, extras))
    }
}
