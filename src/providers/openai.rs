//! OpenAI chat completions backend.
//!
//! Also serves Groq, whose API is OpenAI-compatible.
//! Requires OPENAI_API_KEY (or GROQ_API_KEY for Groq).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{ClassificationBackend, CriterionContext, ProviderError, ProviderKind, Verdict};
use super::config::{default_endpoint, default_model};
use super::http::{check_status, join_url};
use super::prompts::build_prompt;
use super::verdict::parse_verdict;

/// Backend for OpenAI-compatible chat completion APIs.
pub struct OpenAiBackend {
    id: &'static str,
    api_key: String,
    model: String,
    endpoint: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl OpenAiBackend {
    fn with_kind(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            id: kind.as_str(),
            api_key: api_key.into(),
            model: default_model(kind).to_string(),
            endpoint: default_endpoint(kind).to_string(),
            client: Client::new(),
        }
    }

    /// OpenAI (api.openai.com).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::with_kind(ProviderKind::OpenAi, api_key)
    }

    /// Groq (api.groq.com/openai).
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::with_kind(ProviderKind::Groq, api_key)
    }

    /// Set the model (e.g., "gpt-4o-mini", "llama-3.1-8b-instant").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL (without the `/v1/...` path).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl ClassificationBackend for OpenAiBackend {
    fn id(&self) -> &str {
        self.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn classify(
        &self,
        remarks: &str,
        context: &CriterionContext<'_>,
    ) -> Result<Verdict, ProviderError> {
        let prompt = build_prompt(remarks, context);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.0,
            max_tokens: 300,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let url = join_url(&self.endpoint, "v1/chat/completions");
        debug!("{}: classifying '{}' with {}", self.id, context.criterion, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = check_status(self.id, response).await?;

        let chat: ChatResponse = response.json().await?;
        if let Some(error) = chat.error {
            return Err(ProviderError::MalformedResponse(format!(
                "{} returned an error: {}",
                self.id, error.message
            )));
        }

        let content = chat
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ProviderError::MalformedResponse(format!("{} returned no choices", self.id))
            })?;

        parse_verdict(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, ConformanceLevel, Severity};
    use crate::providers::http::mock;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn context() -> CriterionContext<'static> {
        CriterionContext {
            criterion: "3.3.2 Labels or Instructions",
            level: ConformanceLevel::PartiallySupports,
            heuristic: Severity::Low,
        }
    }

    async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-good") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": {"message": "Incorrect API key"}})),
            );
        }
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["response_format"]["type"], "json_object");
        let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
        assert!(prompt.contains("3.3.2 Labels or Instructions"));

        let content = r#"{"severity": "High", "confidence": "high", "rationale": "Inputs have no labels."}"#;
        (
            StatusCode::OK,
            Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]})),
        )
    }

    async fn mock_api() -> String {
        mock::serve(Router::new().route("/v1/chat/completions", post(completions))).await
    }

    #[tokio::test]
    async fn test_classify_success() {
        let base = mock_api().await;
        let backend = OpenAiBackend::openai("sk-good")
            .with_endpoint(base)
            .with_model("gpt-test");

        let verdict = backend
            .classify("Form inputs lack labels", &context())
            .await
            .unwrap();
        assert_eq!(verdict.severity, Severity::High);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(verdict.rationale.as_deref(), Some("Inputs have no labels."));
    }

    #[tokio::test]
    async fn test_bad_key_is_authentication_error() {
        let base = mock_api().await;
        let backend = OpenAiBackend::openai("sk-bad")
            .with_endpoint(base)
            .with_model("gpt-test");

        let err = backend.classify("anything", &context()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_and_server_errors() {
        let router = Router::new()
            .route(
                "/limited/v1/chat/completions",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            )
            .route(
                "/broken/v1/chat/completions",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
            );
        let base = mock::serve(router).await;

        let limited = OpenAiBackend::groq("gsk").with_endpoint(format!("{}/limited", base));
        assert_eq!(limited.id(), "groq");
        let err = limited.classify("x", &context()).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(ref id) if id == "groq"));

        let broken = OpenAiBackend::openai("sk").with_endpoint(format!("{}/broken", base));
        let err = broken.classify("x", &context()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 503, ref body } if body == "overloaded"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let backend = OpenAiBackend::openai("sk").with_endpoint("http://127.0.0.1:9");
        let err = backend.classify("x", &context()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
    }

    #[test]
    fn test_defaults() {
        let backend = OpenAiBackend::groq("gsk");
        assert_eq!(backend.id(), "groq");
        assert_eq!(backend.model(), "llama-3.1-8b-instant");
        assert_eq!(backend.endpoint, "https://api.groq.com/openai");
    }
}
