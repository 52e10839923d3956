//! Google Gemini backend.
//!
//! Uses the `generateContent` API with JSON output.
//! Requires GEMINI_API_KEY environment variable.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{ClassificationBackend, CriterionContext, ProviderError, ProviderKind, Verdict};
use super::config::{default_endpoint, default_model};
use super::http::{check_status, join_url};
use super::prompts::build_prompt;
use super::verdict::parse_verdict;

/// Gemini backend using Google's Generative Language API.
pub struct GeminiBackend {
    api_key: String,
    model: String,
    endpoint: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(ProviderKind::Gemini).to_string(),
            endpoint: default_endpoint(ProviderKind::Gemini).to_string(),
            client: Client::new(),
        }
    }

    /// Set the model (e.g., "gemini-1.5-flash", "gemini-1.5-pro").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl ClassificationBackend for GeminiBackend {
    fn id(&self) -> &str {
        ProviderKind::Gemini.as_str()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn classify(
        &self,
        remarks: &str,
        context: &CriterionContext<'_>,
    ) -> Result<Verdict, ProviderError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_prompt(remarks, context),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.0,
                max_output_tokens: 300,
                response_mime_type: "application/json",
            },
        };

        let url = join_url(
            &self.endpoint,
            &format!("v1beta/models/{}:generateContent", self.model),
        );
        debug!("gemini: classifying '{}' with {}", context.criterion, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = check_status(self.id(), response).await?;

        let gemini: GeminiResponse = response.json().await?;
        if let Some(error) = gemini.error {
            return Err(ProviderError::MalformedResponse(format!(
                "Gemini API error: {}",
                error.message
            )));
        }

        let text = gemini
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| {
                ProviderError::MalformedResponse("Gemini returned no candidates".to_string())
            })?;

        parse_verdict(&text)
    }
}
