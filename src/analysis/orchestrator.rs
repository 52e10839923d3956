//! Backend selection and concurrent per-finding evaluation.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::models::RawCriterionRecord;
use crate::providers::{
    AiConfig, ClassificationBackend, CriterionContext, ProviderError, ProviderRegistry, Verdict,
};
use crate::severity::HeuristicResult;

use super::AnalysisError;

/// Which backend a request asked for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderSelection {
    /// The registry's preferred backend, if any.
    #[default]
    Auto,
    /// One specific backend; never substituted.
    Explicit(String),
    /// Keyword heuristic only.
    Disabled,
}

impl ProviderSelection {
    /// Parse a selection: empty or "auto", "none"/"off", or a backend id.
    pub fn parse(value: Option<&str>) -> Self {
        let value = value.map(|v| v.trim().to_lowercase()).unwrap_or_default();
        match value.as_str() {
            "" | "auto" => ProviderSelection::Auto,
            "none" | "off" => ProviderSelection::Disabled,
            _ => ProviderSelection::Explicit(value),
        }
    }
}

impl std::fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderSelection::Auto => write!(f, "auto"),
            ProviderSelection::Explicit(id) => write!(f, "{}", id),
            ProviderSelection::Disabled => write!(f, "none"),
        }
    }
}

/// Result of asking a backend about one finding.
#[derive(Debug)]
pub enum AiOutcome {
    /// No backend was selected for this request.
    NotRequested,
    Verdict { provider: String, verdict: Verdict },
    Failed { provider: String, error: ProviderError },
}

/// A record queued for classification with its heuristic result.
#[derive(Debug, Clone, Copy)]
pub struct PendingFinding<'a> {
    pub record: &'a RawCriterionRecord,
    pub heuristic: HeuristicResult,
}

/// Timeout and concurrency limits for backend calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub timeout: Duration,
    pub max_concurrency: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&AiConfig::default())
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &AiConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            max_concurrency: config.max_concurrency.max(1),
        }
    }
}

/// Dispatches eligible findings to the selected backend.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(registry: Arc<ProviderRegistry>, settings: OrchestratorSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn settings(&self) -> OrchestratorSettings {
        self.settings
    }

    /// Resolve a selection to a backend.
    ///
    /// `Ok(None)` means no AI runs: selection disabled, or automatic mode with
    /// nothing configured. An explicit id that is not configured is an error.
    pub fn resolve(
        &self,
        selection: &ProviderSelection,
    ) -> Result<Option<Arc<dyn ClassificationBackend>>, AnalysisError> {
        match selection {
            ProviderSelection::Disabled => Ok(None),
            ProviderSelection::Auto => Ok(self.registry.preferred().cloned()),
            ProviderSelection::Explicit(id) => match self.registry.get(id) {
                Some(backend) => Ok(Some(backend.clone())),
                None => Err(AnalysisError::ProviderNotAvailable {
                    requested: id.clone(),
                    available: self.registry.ids(),
                }),
            },
        }
    }

    /// Ask `backend` about every pending finding.
    ///
    /// Calls run concurrently up to `max_concurrency`, each under its own
    /// timeout. Outcomes are returned in input order. A failed or timed-out
    /// call only affects its own finding.
    pub async fn evaluate(
        &self,
        backend: Option<&Arc<dyn ClassificationBackend>>,
        pending: &[PendingFinding<'_>],
    ) -> Vec<AiOutcome> {
        let Some(backend) = backend else {
            return pending.iter().map(|_| AiOutcome::NotRequested).collect();
        };

        info!(
            "Classifying {} findings with {} (model: {}, concurrency: {})",
            pending.len(),
            backend.id(),
            backend.model(),
            self.settings.max_concurrency
        );

        let timeout = self.settings.timeout;
        let mut outcomes: Vec<Option<AiOutcome>> = pending.iter().map(|_| None).collect();

        // Collected first; the stream must stay Send.
        let calls: Vec<_> = pending
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let backend = Arc::clone(backend);
                async move { (index, classify_one(backend.as_ref(), item, timeout).await) }
            })
            .collect();

        let results: Vec<(usize, AiOutcome)> = stream::iter(calls)
            .buffer_unordered(self.settings.max_concurrency)
            .collect()
            .await;

        for (index, outcome) in results {
            outcomes[index] = Some(outcome);
        }

        outcomes
            .into_iter()
            .map(|o| o.unwrap_or(AiOutcome::NotRequested))
            .collect()
    }
}

async fn classify_one(
    backend: &dyn ClassificationBackend,
    item: &PendingFinding<'_>,
    timeout: Duration,
) -> AiOutcome {
    let record = item.record;
    let context = CriterionContext {
        criterion: &record.criterion_id,
        level: record.conformance_level,
        heuristic: item.heuristic.severity,
    };
    let provider = backend.id().to_string();

    match tokio::time::timeout(timeout, backend.classify(&record.remarks, &context)).await {
        Ok(Ok(verdict)) => {
            debug!(
                "{}: {} -> {} ({})",
                provider, record.criterion_id, verdict.severity, verdict.confidence
            );
            AiOutcome::Verdict { provider, verdict }
        }
        Ok(Err(error)) => {
            warn!("{} failed for {}: {}", provider, record.criterion_id, error);
            AiOutcome::Failed { provider, error }
        }
        Err(_) => {
            warn!("{} timed out for {}", provider, record.criterion_id);
            AiOutcome::Failed {
                provider,
                error: ProviderError::Timeout(timeout),
            }
        }
    }
}
