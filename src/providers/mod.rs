//! AI classification backends.
//!
//! Supported backends:
//! - OpenAI: chat completions (OPENAI_API_KEY)
//! - Gemini: Google generateContent (GEMINI_API_KEY)
//! - Groq: OpenAI-compatible API (GROQ_API_KEY)
//! - Ollama: local `/api/generate` (OLLAMA_HOST)
//!
//! All backends share one prompt and one verdict parser, and are collected
//! into an immutable `ProviderRegistry` at startup.

mod backend;
mod config;
mod gemini;
mod http;
mod ollama;
mod openai;
mod prompts;
mod registry;
mod verdict;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{ClassificationBackend, CriterionContext, ProviderError, ProviderKind, Verdict};
pub use config::{AiConfig, ProviderSettings};
pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use prompts::{build_prompt, CLASSIFICATION_PROMPT};
pub use registry::{availability_hint, ProviderRegistry};
pub use verdict::parse_verdict;
