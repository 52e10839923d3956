//! Immutable set of configured classification backends.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::backend::{ClassificationBackend, ProviderError, ProviderKind};
use super::config::AiConfig;
use super::gemini::GeminiBackend;
use super::http::build_client;
use super::ollama::OllamaBackend;
use super::openai::OpenAiBackend;

/// Configured backends in preference order.
///
/// Built once at startup and shared read-only; the first entry is the
/// preferred backend for automatic selection.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    backends: Vec<Arc<dyn ClassificationBackend>>,
}

impl ProviderRegistry {
    /// Registry over explicit backends, in the given order.
    pub fn new(backends: Vec<Arc<dyn ClassificationBackend>>) -> Self {
        Self { backends }
    }

    /// Registry with no backends; every analysis uses the keyword heuristic.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build every backend whose settings are present, in preference order.
    pub fn from_config(config: &AiConfig) -> Result<Self, ProviderError> {
        let client = build_client(Duration::from_secs(config.timeout_secs.max(1)))?;
        let mut backends: Vec<Arc<dyn ClassificationBackend>> = Vec::new();

        for kind in config.preference_order() {
            let settings = config.settings(kind);
            if !settings.is_configured(kind) {
                debug!("Provider {} not configured ({})", kind, availability_hint(kind));
                continue;
            }

            let model = settings.model_or_default(kind);
            let endpoint = settings.endpoint_or_default(kind);
            let api_key = settings.api_key.clone().unwrap_or_default();

            let backend: Arc<dyn ClassificationBackend> = match kind {
                ProviderKind::OpenAi => Arc::new(
                    OpenAiBackend::openai(api_key)
                        .with_model(model)
                        .with_endpoint(endpoint)
                        .with_client(client.clone()),
                ),
                ProviderKind::Groq => Arc::new(
                    OpenAiBackend::groq(api_key)
                        .with_model(model)
                        .with_endpoint(endpoint)
                        .with_client(client.clone()),
                ),
                ProviderKind::Gemini => Arc::new(
                    GeminiBackend::new(api_key)
                        .with_model(model)
                        .with_endpoint(endpoint)
                        .with_client(client.clone()),
                ),
                ProviderKind::Ollama => Arc::new(
                    OllamaBackend::new()
                        .with_model(model)
                        .with_endpoint(endpoint)
                        .with_client(client.clone()),
                ),
            };

            debug!("Provider {} configured (model: {})", kind, backend.model());
            backends.push(backend);
        }

        let registry = Self::new(backends);
        info!(
            "Provider registry initialized with {} backends: [{}]",
            registry.len(),
            registry.ids().join(", ")
        );
        Ok(registry)
    }

    /// Configured backend ids in preference order.
    pub fn ids(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.id().to_string()).collect()
    }

    /// Backend used for automatic selection.
    pub fn preferred(&self) -> Option<&Arc<dyn ClassificationBackend>> {
        self.backends.first()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn ClassificationBackend>> {
        let id = id.trim();
        self.backends.iter().find(|b| b.id().eq_ignore_ascii_case(id))
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("backends", &self.ids())
            .finish()
    }
}

/// What is needed to enable a backend.
pub fn availability_hint(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "set OPENAI_API_KEY",
        ProviderKind::Gemini => "set GEMINI_API_KEY (https://ai.google.dev/)",
        ProviderKind::Groq => "set GROQ_API_KEY (https://console.groq.com/)",
        ProviderKind::Ollama => "set OLLAMA_HOST or [ai.ollama].endpoint",
    }
}
