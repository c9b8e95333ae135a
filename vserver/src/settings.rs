//! Process settings read once from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment};
use serde::Deserialize;
use vitae::{
    DEFAULT_MAX_MESSAGES, DEFAULT_PREAMBLE_PATH, DEFAULT_PROFILE_PATH, HistoryConfig,
    PreambleSource, ProviderConfig, RuntimeConfig, SecretString,
};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_RETENTION_DAYS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Variables as they appear in the environment, lowercased by `config`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawSettings {
    port: u16,
    client_origin: String,
    use_ollama: Option<String>,
    use_cloudflare: Option<String>,
    ollama_base_url: Option<String>,
    ollama_model: Option<String>,
    cloudflare_account_id: Option<String>,
    cloudflare_api_token: Option<String>,
    cloudflare_model: Option<String>,
    prompt_path: String,
    profile_path: String,
    history_max_messages: usize,
    history_db_path: Option<String>,
    history_retention_days: u64,
    request_timeout_secs: u64,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            client_origin: DEFAULT_CLIENT_ORIGIN.to_string(),
            use_ollama: None,
            use_cloudflare: None,
            ollama_base_url: None,
            ollama_model: None,
            cloudflare_account_id: None,
            cloudflare_api_token: None,
            cloudflare_model: None,
            prompt_path: DEFAULT_PREAMBLE_PATH.to_string(),
            profile_path: DEFAULT_PROFILE_PATH.to_string(),
            history_max_messages: DEFAULT_MAX_MESSAGES,
            history_db_path: None,
            history_retention_days: DEFAULT_RETENTION_DAYS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Immutable server settings. Built once and passed to whoever needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub client_origin: String,
    pub provider: ProviderConfig,
    pub history: HistoryConfig,
    pub profile_path: PathBuf,
    pub request_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_builder(Config::builder().add_source(Environment::default()))
    }

    /// Settings from explicit `NAME=value` pairs, ignoring the process environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut builder = Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(key.as_ref().to_ascii_lowercase(), value.into())?;
        }

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let raw: RawSettings = builder
            .build()
            .and_then(Config::try_deserialize)
            .context("invalid server settings")?;

        raw.resolve()
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::new(self.provider.clone())
            .with_history(self.history.clone())
            .with_profile_path(self.profile_path.clone())
            .with_request_timeout(self.request_timeout)
    }
}

impl RawSettings {
    fn resolve(self) -> anyhow::Result<Settings> {
        let use_ollama = flag(self.use_ollama.as_deref());
        let use_cloudflare = flag(self.use_cloudflare.as_deref());
        if use_ollama && use_cloudflare {
            bail!("USE_OLLAMA and USE_CLOUDFLARE cannot both be enabled");
        }

        let preamble = PreambleSource::File(PathBuf::from(self.prompt_path));
        let provider = if use_cloudflare {
            let mut config = ProviderConfig::cloud(
                self.cloudflare_account_id.unwrap_or_default(),
                SecretString::new(self.cloudflare_api_token.unwrap_or_default()),
            );
            if let Some(model) = non_blank(self.cloudflare_model) {
                config = config.with_model(model);
            }
            config.with_preamble(preamble)
        } else if use_ollama {
            let mut config = ProviderConfig::local();
            if let Some(base_url) = non_blank(self.ollama_base_url) {
                config = config.with_base_url(base_url.trim_end_matches('/'));
            }
            if let Some(model) = non_blank(self.ollama_model) {
                config = config.with_model(model);
            }
            config.with_preamble(preamble)
        } else {
            ProviderConfig::Placeholder
        };

        let history = match non_blank(self.history_db_path) {
            Some(path) => HistoryConfig::Sqlite {
                path: PathBuf::from(path),
                max_messages: self.history_max_messages,
                retention: (self.history_retention_days > 0).then(|| {
                    Duration::from_secs(self.history_retention_days * SECONDS_PER_DAY)
                }),
            },
            None => HistoryConfig::InMemory {
                max_messages: self.history_max_messages,
            },
        };

        Ok(Settings {
            port: self.port,
            client_origin: self.client_origin,
            provider,
            history,
            profile_path: PathBuf::from(self.profile_path),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
