//! HTTP API for report analysis.
//!
//! Exposes the analysis pipeline over a small JSON API:
//! - `POST /api/analyze` accepts a multipart upload and returns the analysis
//! - `GET /api/ai-providers` lists the configured classification backends
//! - `GET /health` and `GET /` for probes and discovery

mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::analysis::{Analyzer, OrchestratorSettings};
use crate::config::Config;
use crate::providers::ProviderRegistry;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    /// Request body limit for uploads.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let registry = ProviderRegistry::from_config(&config.ai)?;
        let settings = OrchestratorSettings::from_config(&config.ai);

        Ok(Self {
            analyzer: Arc::new(Analyzer::new(Arc::new(registry), settings)),
            max_upload_bytes: config.server.max_upload_bytes(),
        })
    }

    pub fn with_analyzer(analyzer: Analyzer, max_upload_bytes: usize) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            max_upload_bytes,
        }
    }
}

/// Start the web server.
pub async fn serve(config: &Config, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    tracing::info!(
        "AI providers: {}",
        match state.analyzer.registry().ids() {
            ids if ids.is_empty() => "none (keyword analysis only)".to_string(),
            ids => ids.join(", "),
        }
    );
    let app = create_router(state);

    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
