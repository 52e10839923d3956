//! Analysis result payload returned to callers.
//!
//! Field names here are consumed by the report renderer and must stay stable.

use serde::{Deserialize, Serialize};

use super::finding::Finding;

/// Placeholder for metadata that could not be located in the document.
pub const NOT_FOUND: &str = "Not Found";

/// Conformance tally across every row of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformanceSummary {
    pub supports: usize,
    pub partially_supports: usize,
    pub does_not_support: usize,
    pub not_applicable: usize,
}

impl ConformanceSummary {
    pub fn total(&self) -> usize {
        self.supports + self.partially_supports + self.does_not_support + self.not_applicable
    }
}

/// Which AI backends were available and which were actually used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAnalysisSummary {
    pub providers_configured: Vec<String>,
    pub providers_used: Vec<String>,
    pub preferred_provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub vpat_version: String,
    pub product_version: String,
    pub report_age: String,
    pub summary: ConformanceSummary,
    /// Findings in document order.
    pub detailed_findings: Vec<Finding>,
    pub ai_analysis_summary: AiAnalysisSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub filename: String,
    pub analysis_results: AnalysisResults,
}
