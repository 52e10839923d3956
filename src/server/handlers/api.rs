//! API endpoint handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::super::AppState;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Service banner.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the A11y Analyzer API!",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub available_providers: Vec<String>,
    pub preferred_provider: Option<String>,
}

/// List configured classification backends in preference order.
pub async fn list_providers(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.analyzer.registry();

    Json(ProvidersResponse {
        available_providers: registry.ids(),
        preferred_provider: registry.preferred().map(|b| b.id().to_string()),
    })
}
