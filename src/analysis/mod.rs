//! Analysis pipeline: heuristic classification, backend orchestration,
//! correction merge and aggregation.

mod aggregate;
mod engine;
mod merge;
mod orchestrator;

pub use aggregate::{
    aggregate, providers_used, report_age, tally, ProviderSummaryInput, AGE_UNKNOWN,
    AGE_UNPARSEABLE,
};
pub use engine::Analyzer;
pub use merge::{merge, REASON_AI_CONFIRMED, REASON_AI_CORRECTED, REASON_NO_PROVIDER};
pub use orchestrator::{AiOutcome, Orchestrator, OrchestratorSettings, PendingFinding, ProviderSelection};

use thiserror::Error;

use crate::parsers::ParseError;

/// Errors that fail a whole analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("AI provider '{requested}' is not available (configured: {})", describe_available(.available))]
    ProviderNotAvailable {
        requested: String,
        available: Vec<String>,
    },
}

fn describe_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}
