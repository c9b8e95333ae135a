//! Provider construction from a resolved [`ProviderConfig`].
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use vitae::{NoopStreamHooks, ProviderConfig, ProviderId, build_provider};
//!
//! let provider = build_provider(
//!     &ProviderConfig::Placeholder,
//!     Duration::from_secs(5),
//!     Arc::new(NoopStreamHooks),
//! )
//! .expect("placeholder always builds");
//! assert_eq!(provider.id(), ProviderId::Placeholder);
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use vprovider::{
    CLOUDFLARE_BASE_URL, CLOUDFLARE_DEFAULT_MODEL, ChatProvider, CloudflareProvider, HttpTransport,
    OLLAMA_BASE_URL, OLLAMA_DEFAULT_MODEL, OllamaProvider, PlaceholderProvider, PreambleSource,
    ProviderError, ProviderId, ProviderStreamHooks, SecretString, StreamTransport,
};

/// Which provider answers prompts. Resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    Local {
        base_url: String,
        model: String,
        preamble: PreambleSource,
    },
    Cloud {
        account_id: String,
        api_token: SecretString,
        model: String,
        base_url: String,
        preamble: PreambleSource,
    },
    Placeholder,
}

impl ProviderConfig {
    pub fn local() -> Self {
        Self::Local {
            base_url: OLLAMA_BASE_URL.to_string(),
            model: OLLAMA_DEFAULT_MODEL.to_string(),
            preamble: PreambleSource::default(),
        }
    }

    pub fn cloud(account_id: impl Into<String>, api_token: SecretString) -> Self {
        Self::Cloud {
            account_id: account_id.into(),
            api_token,
            model: CLOUDFLARE_DEFAULT_MODEL.to_string(),
            base_url: CLOUDFLARE_BASE_URL.to_string(),
            preamble: PreambleSource::default(),
        }
    }

    pub fn with_base_url(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Local { base_url, .. } | Self::Cloud { base_url, .. } => *base_url = value.into(),
            Self::Placeholder => {}
        }
        self
    }

    pub fn with_model(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Local { model, .. } | Self::Cloud { model, .. } => *model = value.into(),
            Self::Placeholder => {}
        }
        self
    }

    pub fn with_preamble(mut self, source: PreambleSource) -> Self {
        match &mut self {
            Self::Local { preamble, .. } | Self::Cloud { preamble, .. } => *preamble = source,
            Self::Placeholder => {}
        }
        self
    }

    pub fn provider_id(&self) -> ProviderId {
        match self {
            Self::Local { .. } => ProviderId::Ollama,
            Self::Cloud { .. } => ProviderId::Cloudflare,
            Self::Placeholder => ProviderId::Placeholder,
        }
    }
}

/// Builds the configured provider over a reqwest client.
///
/// `timeout` bounds connecting and each read of the body, not the whole
/// exchange, so a long answer keeps streaming as long as tokens keep arriving.
pub fn build_provider(
    config: &ProviderConfig,
    timeout: Duration,
    hooks: Arc<dyn ProviderStreamHooks>,
) -> Result<Arc<dyn ChatProvider>, ProviderError> {
    if matches!(config, ProviderConfig::Placeholder) {
        return Ok(Arc::new(PlaceholderProvider));
    }

    let transport = Arc::new(HttpTransport::new(http_client(timeout)?));
    build_provider_with_transport(config, transport, hooks)
}

fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))
}

pub fn build_provider_with_transport(
    config: &ProviderConfig,
    transport: Arc<dyn StreamTransport>,
    hooks: Arc<dyn ProviderStreamHooks>,
) -> Result<Arc<dyn ChatProvider>, ProviderError> {
    match config {
        ProviderConfig::Local {
            base_url,
            model,
            preamble,
        } => Ok(Arc::new(
            OllamaProvider::new(transport)
                .with_base_url(base_url.clone())
                .with_model(model.clone())
                .with_preamble(preamble.clone())
                .with_hooks(hooks),
        )),
        ProviderConfig::Cloud {
            account_id,
            api_token,
            model,
            base_url,
            preamble,
        } => {
            if account_id.trim().is_empty() {
                return Err(ProviderError::authentication(
                    "cloud account id must not be empty",
                ));
            }
            if api_token.is_empty() {
                return Err(ProviderError::authentication(
                    "cloud API token must not be empty",
                ));
            }

            Ok(Arc::new(
                CloudflareProvider::new(transport, account_id.trim(), api_token.clone())
                    .with_base_url(base_url.clone())
                    .with_model(model.clone())
                    .with_preamble(preamble.clone())
                    .with_hooks(hooks),
            ))
        }
        ProviderConfig::Placeholder => Ok(Arc::new(PlaceholderProvider)),
    }
}
