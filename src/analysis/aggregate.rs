//! Report-level tallies and the final result payload.

use chrono::{Datelike, NaiveDate};

use crate::models::{
    AiAnalysisSummary, AnalysisResult, AnalysisResults, ConformanceLevel, ConformanceSummary,
    Finding, RawCriterionRecord, RawRecordSet, ReportMetadata, NOT_FOUND, NO_PROVIDER,
};

/// Report age when no date was found.
pub const AGE_UNKNOWN: &str = "N/A";

/// Report age when a date label was found but its value did not parse.
pub const AGE_UNPARSEABLE: &str = "Could not parse date";

/// Provider information that comes from the request, not the findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSummaryInput {
    pub providers_configured: Vec<String>,
    pub preferred_provider: Option<String>,
}

/// Count rows per conformance level.
pub fn tally(rows: &[RawCriterionRecord]) -> ConformanceSummary {
    rows.iter()
        .fold(ConformanceSummary::default(), |mut summary, row| {
            match row.conformance_level {
                ConformanceLevel::Supports => summary.supports += 1,
                ConformanceLevel::PartiallySupports => summary.partially_supports += 1,
                ConformanceLevel::DoesNotSupport => summary.does_not_support += 1,
                ConformanceLevel::NotApplicable => summary.not_applicable += 1,
            }
            summary
        })
}

/// Distinct providers whose verdicts were used, in first-use order.
pub fn providers_used(findings: &[Finding]) -> Vec<String> {
    let mut used: Vec<String> = Vec::new();
    for finding in findings {
        if finding.provider_used != NO_PROVIDER && !used.contains(&finding.provider_used) {
            used.push(finding.provider_used.clone());
        }
    }
    used
}

/// Human-readable age of the report relative to `today`.
pub fn report_age(metadata: &ReportMetadata, today: NaiveDate) -> String {
    match (metadata.report_date, &metadata.report_date_raw) {
        (Some(date), _) => months_old(date, today),
        (None, Some(_)) => AGE_UNPARSEABLE.to_string(),
        (None, None) => AGE_UNKNOWN.to_string(),
    }
}

fn months_old(date: NaiveDate, today: NaiveDate) -> String {

    let months = (today.year() - date.year()) * 12 + today.month() as i32 - date.month() as i32;
    let months = months.max(0);

    if months < 12 {
        format!("{} months old", months)
    } else {
        format!("Over {} year(s) old", months / 12)
    }
}

/// Assemble the result payload.
pub fn aggregate(
    filename: &str,
    record_set: &RawRecordSet,
    findings: Vec<Finding>,
    providers: ProviderSummaryInput,
    today: NaiveDate,
) -> AnalysisResult {
    let metadata = &record_set.metadata;
    let used = providers_used(&findings);

    AnalysisResult {
        filename: filename.to_string(),
        analysis_results: AnalysisResults {
            vpat_version: metadata
                .vpat_version
                .clone()
                .unwrap_or_else(|| NOT_FOUND.to_string()),
            product_version: metadata
                .product_version
                .clone()
                .unwrap_or_else(|| NOT_FOUND.to_string()),
            report_age: report_age(metadata, today),
            summary: tally(&record_set.rows),
            detailed_findings: findings,
            ai_analysis_summary: AiAnalysisSummary {
                providers_configured: providers.providers_configured,
                providers_used: used,
                preferred_provider: providers.preferred_provider,
            },
        },
    }
}
