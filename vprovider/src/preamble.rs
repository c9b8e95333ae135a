//! Lazily loaded, cached system preamble.

use std::path::PathBuf;

use tokio::sync::OnceCell;

use crate::{ProviderId, ProviderStreamHooks};

pub const DEFAULT_PREAMBLE: &str = "Eres un asistente para un portfolio profesional.";
pub const DEFAULT_PREAMBLE_PATH: &str = "PROMPT.md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreambleSource {
    File(PathBuf),
    Inline(String),
}

impl Default for PreambleSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_PREAMBLE_PATH))
    }
}

/// Preamble text read at most once per provider instance.
///
/// An unreadable file falls back to [`DEFAULT_PREAMBLE`]; the fallback is cached
/// too, so a missing file is reported once.
#[derive(Debug, Default)]
pub struct Preamble {
    source: PreambleSource,
    cached: OnceCell<String>,
}

impl Preamble {
    pub fn new(source: PreambleSource) -> Self {
        Self {
            source,
            cached: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &PreambleSource {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.initialized()
    }

    pub async fn load(&self, provider: ProviderId, hooks: &dyn ProviderStreamHooks) -> &str {
        self.cached
            .get_or_init(|| async {
                match &self.source {
                    PreambleSource::Inline(text) => text.clone(),
                    PreambleSource::File(path) => match tokio::fs::read_to_string(path).await {
                        Ok(text) => text,
                        Err(error) => {
                            hooks.on_preamble_fallback(
                                provider,
                                &path.display().to_string(),
                                &error.to_string(),
                            );
                            DEFAULT_PREAMBLE.to_string()
                        }
                    },
                }
            })
            .await
            .as_str()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingHooks {
        fallbacks: Mutex<Vec<String>>,
    }

    impl ProviderStreamHooks for RecordingHooks {
        fn on_preamble_fallback(&self, _provider: ProviderId, source: &str, _reason: &str) {
            self.fallbacks
                .lock()
                .expect("fallbacks lock")
                .push(source.to_string());
        }
    }

    fn temp_file(prefix: &str) -> PathBuf {
        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("vprovider-{prefix}-{unique}.md"))
    }

    #[tokio::test]
    async fn file_preamble_is_read_once_and_cached() {
        let path = temp_file("preamble");
        std::fs::write(&path, "Habla como Ada.").expect("preamble should write");

        let hooks = RecordingHooks::default();
        let preamble = Preamble::new(PreambleSource::File(path.clone()));
        assert!(!preamble.is_loaded());

        assert_eq!(preamble.load(ProviderId::Ollama, &hooks).await, "Habla como Ada.");
        std::fs::write(&path, "changed on disk").expect("preamble should rewrite");
        assert_eq!(preamble.load(ProviderId::Ollama, &hooks).await, "Habla como Ada.");
        assert!(preamble.is_loaded());

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_default_and_reports_once() {
        let hooks = RecordingHooks::default();
        let preamble = Preamble::new(PreambleSource::File(temp_file("missing")));

        assert_eq!(preamble.load(ProviderId::Cloudflare, &hooks).await, DEFAULT_PREAMBLE);
        assert_eq!(preamble.load(ProviderId::Cloudflare, &hooks).await, DEFAULT_PREAMBLE);
        assert_eq!(hooks.fallbacks.lock().expect("fallbacks lock").len(), 1);
    }

    #[tokio::test]
    async fn inline_preamble_is_used_verbatim() {
        let preamble = Preamble::new(PreambleSource::Inline("inline text".to_string()));
        assert_eq!(
            preamble.load(ProviderId::Ollama, &crate::NoopStreamHooks).await,
            "inline text"
        );
    }
}
