//! Data models for conformance report analysis.

mod analysis;
mod finding;
mod record;

pub use analysis::{AiAnalysisSummary, AnalysisResult, AnalysisResults, ConformanceSummary, NOT_FOUND};
pub use finding::{Confidence, Finding, Severity, NO_PROVIDER};
pub use record::{ConformanceLevel, RawCriterionRecord, RawRecordSet, ReportMetadata};
