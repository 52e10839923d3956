//! Classification backend abstraction.
//!
//! A backend receives one criterion's remark text and returns a severity
//! verdict. Backends never retry; the orchestrator falls back to the keyword
//! heuristic on any error.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Confidence, ConformanceLevel, Severity};

/// Errors from classification backends.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited by {0}")]
    RateLimited(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Http(format!("timeout: {}", e))
        } else if e.is_decode() {
            ProviderError::MalformedResponse(e.to_string())
        } else {
            ProviderError::Http(e.to_string())
        }
    }
}

/// A backend's judgement on one criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub severity: Severity,
    pub confidence: Confidence,
    pub rationale: Option<String>,
}

/// What a backend is told about the criterion besides its remarks.
#[derive(Debug, Clone, Copy)]
pub struct CriterionContext<'a> {
    pub criterion: &'a str,
    pub level: ConformanceLevel,
    /// Severity the keyword heuristic assigned.
    pub heuristic: Severity,
}

/// Supported backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// OpenAI chat completions.
    OpenAi,
    /// Google Gemini generateContent.
    Gemini,
    /// Groq (OpenAI-compatible API).
    Groq,
    /// Local Ollama server.
    Ollama,
}

impl ProviderKind {
    /// Automatic preference order.
    pub const DEFAULT_ORDER: [ProviderKind; 4] = [
        ProviderKind::OpenAi,
        ProviderKind::Gemini,
        ProviderKind::Groq,
        ProviderKind::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Groq => "groq",
            ProviderKind::Ollama => "ollama",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "gemini" | "google" => Some(ProviderKind::Gemini),
            "groq" => Some(ProviderKind::Groq),
            "ollama" => Some(ProviderKind::Ollama),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for classification backends.
#[async_trait]
pub trait ClassificationBackend: Send + Sync {
    /// Stable id used in selection and provenance ("openai", "gemini", ...).
    fn id(&self) -> &str;

    /// Model name sent to the API.
    fn model(&self) -> &str;

    /// Classify one criterion's remarks.
    async fn classify(
        &self,
        remarks: &str,
        context: &CriterionContext<'_>,
    ) -> Result<Verdict, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in ProviderKind::DEFAULT_ORDER {
            assert_eq!(ProviderKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(ProviderKind::from_str(" OpenAI "), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::from_str("claude"), None);
    }

    #[test]
    fn test_default_order() {
        let ids: Vec<_> = ProviderKind::DEFAULT_ORDER.iter().map(|k| k.as_str()).collect();
        assert_eq!(ids, vec!["openai", "gemini", "groq", "ollama"]);
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Api {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "API error (503): overloaded");
        assert_eq!(
            ProviderError::Timeout(Duration::from_secs(20)).to_string(),
            "Request timed out after 20s"
        );
    }
}
