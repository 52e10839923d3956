//! Local Ollama backend (`/api/generate`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{ClassificationBackend, CriterionContext, ProviderError, ProviderKind, Verdict};
use super::config::{default_endpoint, default_model};
use super::http::{check_status, join_url};
use super::prompts::build_prompt;
use super::verdict::parse_verdict;

pub struct OllamaBackend {
    model: String,
    endpoint: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new() -> Self {
        Self {
            model: default_model(ProviderKind::Ollama).to_string(),
            endpoint: default_endpoint(ProviderKind::Ollama).to_string(),
            client: Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the Ollama server URL (e.g., "http://localhost:11434").
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClassificationBackend for OllamaBackend {
    fn id(&self) -> &str {
        ProviderKind::Ollama.as_str()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn classify(
        &self,
        remarks: &str,
        context: &CriterionContext<'_>,
    ) -> Result<Verdict, ProviderError> {
        let request = OllamaRequest {
            model: &self.model,
            prompt: build_prompt(remarks, context),
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: 0.0,
                num_predict: 300,
            },
        };

        let url = join_url(&self.endpoint, "api/generate");
        debug!("ollama: classifying '{}' with {}", context.criterion, self.model);

        let response = self.client.post(&url).json(&request).send().await?;
        let response = check_status(self.id(), response).await?;
        let ollama: OllamaResponse = response.json().await?;

        parse_verdict(&ollama.response)
    }
}
