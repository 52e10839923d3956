//! Shared HTTP plumbing for the cloud and local backends.

use std::time::Duration;

use reqwest::{Client, Response};

use super::backend::ProviderError;

/// Connect timeout for every backend client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest error body kept in a `ProviderError`.
const MAX_ERROR_BODY: usize = 500;

/// Build the HTTP client shared by backends.
pub fn build_client(request_timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(concat!("a11y-analyzer/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .build()
        .map_err(|e| ProviderError::Http(format!("Failed to create HTTP client: {}", e)))
}

/// Map a non-success response to the matching `ProviderError`.
pub(super) async fn check_status(backend: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = truncate_body(body.trim());

    match status.as_u16() {
        401 | 403 => Err(ProviderError::Authentication(format!(
            "{} rejected credentials ({}): {}",
            backend, status, body
        ))),
        429 => Err(ProviderError::RateLimited(backend.to_string())),
        code => Err(ProviderError::Api { status: code, body }),
    }
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

/// Join a base URL and a path without doubling slashes.
pub(super) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
