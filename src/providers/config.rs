//! Backend configuration.
//!
//! Each backend is configured from its environment variables, with values
//! from the config file taking precedence:
//!
//! | Backend | Variables |
//! |---------|-----------|
//! | openai  | `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_ENDPOINT` |
//! | gemini  | `GEMINI_API_KEY`, `GEMINI_MODEL` |
//! | groq    | `GROQ_API_KEY`, `GROQ_MODEL` |
//! | ollama  | `OLLAMA_HOST`, `OLLAMA_MODEL` |
//!
//! Cloud backends are configured when they have an API key. Ollama is
//! configured when a host is known.

use serde::{Deserialize, Serialize};

use super::backend::ProviderKind;

/// Connection settings for one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ProviderSettings {
    /// Read settings for `kind` from the environment.
    pub fn from_env(kind: ProviderKind) -> Self {
        Self::from_lookup(kind, |name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup(kind: ProviderKind, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        match kind {
            ProviderKind::OpenAi => Self {
                api_key: var("OPENAI_API_KEY"),
                model: var("OPENAI_MODEL"),
                endpoint: var("OPENAI_ENDPOINT"),
            },
            ProviderKind::Gemini => Self {
                api_key: var("GEMINI_API_KEY"),
                model: var("GEMINI_MODEL"),
                endpoint: None,
            },
            ProviderKind::Groq => Self {
                api_key: var("GROQ_API_KEY"),
                model: var("GROQ_MODEL"),
                endpoint: None,
            },
            ProviderKind::Ollama => Self {
                api_key: None,
                model: var("OLLAMA_MODEL"),
                endpoint: var("OLLAMA_HOST").map(|host| normalize_host(&host)),
            },
        }
    }

    /// Fill unset fields from `fallback`.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            api_key: self.api_key.or(fallback.api_key),
            model: self.model.or(fallback.model),
            endpoint: self.endpoint.or(fallback.endpoint),
        }
    }

    /// Whether these settings are enough to build the backend.
    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Ollama => self.endpoint.is_some(),
            _ => self.api_key.is_some(),
        }
    }

    pub fn model_or_default(&self, kind: ProviderKind) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| default_model(kind).to_string())
    }

    pub fn endpoint_or_default(&self, kind: ProviderKind) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| default_endpoint(kind).to_string())
    }
}

/// Default model per backend.
pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "gpt-4o-mini",
        ProviderKind::Gemini => "gemini-1.5-flash",
        ProviderKind::Groq => "llama-3.1-8b-instant",
        ProviderKind::Ollama => "llama3.1:8b",
    }
}

/// Default API base URL per backend.
pub fn default_endpoint(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "https://api.openai.com",
        ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
        ProviderKind::Groq => "https://api.groq.com/openai",
        ProviderKind::Ollama => "http://localhost:11434",
    }
}

/// `OLLAMA_HOST` is often given without a scheme ("0.0.0.0:11434").
fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

/// `[ai]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum concurrent backend calls per analysis.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Automatic preference order; empty means the built-in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,
    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub gemini: ProviderSettings,
    #[serde(default)]
    pub groq: ProviderSettings,
    #[serde(default)]
    pub ollama: ProviderSettings,
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_concurrency() -> usize {
    4
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            order: Vec::new(),
            openai: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
            groq: ProviderSettings::default(),
            ollama: ProviderSettings::default(),
        }
    }
}

impl AiConfig {
    /// File settings for `kind`, without environment values.
    pub fn file_settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Groq => &self.groq,
            ProviderKind::Ollama => &self.ollama,
        }
    }

    /// Effective settings for `kind`: file values over environment values.
    pub fn settings(&self, kind: ProviderKind) -> ProviderSettings {
        self.file_settings(kind)
            .clone()
            .or(ProviderSettings::from_env(kind))
    }

    /// Preference order, with unknown names dropped and duplicates removed.
    pub fn preference_order(&self) -> Vec<ProviderKind> {
        if self.order.is_empty() {
            return ProviderKind::DEFAULT_ORDER.to_vec();
        }

        let mut order = Vec::new();
        for name in &self.order {
            match ProviderKind::from_str(name) {
                Some(kind) if !order.contains(&kind) => order.push(kind),
                Some(_) => {}
                None => tracing::warn!("Ignoring unknown provider '{}' in [ai].order", name),
            }
        }
        order
    }
}
