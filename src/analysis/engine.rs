//! Whole-document analysis pipeline.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::models::{AnalysisResult, Finding, RawRecordSet};
use crate::parsers;
use crate::providers::{ClassificationBackend, ProviderRegistry};
use crate::severity;

use super::aggregate::{aggregate, ProviderSummaryInput};
use super::merge::merge;
use super::orchestrator::{Orchestrator, OrchestratorSettings, PendingFinding, ProviderSelection};
use super::AnalysisError;

/// Runs parse, classify, merge and aggregate for one document.
#[derive(Debug, Clone)]
pub struct Analyzer {
    orchestrator: Orchestrator,
}

impl Analyzer {
    pub fn new(registry: Arc<ProviderRegistry>, settings: OrchestratorSettings) -> Self {
        Self {
            orchestrator: Orchestrator::new(registry, settings),
        }
    }

    /// Analyzer without backends (keyword heuristic only).
    pub fn heuristic_only() -> Self {
        Self::new(Arc::new(ProviderRegistry::empty()), OrchestratorSettings::default())
    }

    pub fn registry(&self) -> &ProviderRegistry {
        self.orchestrator.registry()
    }

    /// Analyze a document, dating the report against the local date.
    pub async fn analyze(
        &self,
        filename: &str,
        bytes: &[u8],
        declared_type: Option<&str>,
        selection: &ProviderSelection,
    ) -> Result<AnalysisResult, AnalysisError> {
        let today = Local::now().date_naive();
        self.analyze_on(filename, bytes, declared_type, selection, today)
            .await
    }

    /// Analyze a document with an explicit "today" for the report age.
    pub async fn analyze_on(
        &self,
        filename: &str,
        bytes: &[u8],
        declared_type: Option<&str>,
        selection: &ProviderSelection,
        today: NaiveDate,
    ) -> Result<AnalysisResult, AnalysisError> {
        // Unknown explicit providers fail before any parsing work.
        let backend = self.orchestrator.resolve(selection)?;

        info!(
            "Analyzing {} ({} bytes, provider: {})",
            filename,
            bytes.len(),
            backend.as_ref().map(|b| b.id()).unwrap_or("none")
        );

        let record_set = parsers::parse(bytes, declared_type).await?;
        let findings = self.classify_records(&record_set, backend.as_ref()).await;

        let result = aggregate(
            filename,
            &record_set,
            findings,
            self.provider_summary(),
            today,
        );

        info!(
            "Analysis of {} complete: {} rows, {} findings",
            filename,
            record_set.rows.len(),
            result.analysis_results.detailed_findings.len()
        );
        Ok(result)
    }

    /// Classify every eligible record of a parsed report, in document order.
    pub async fn classify_records(
        &self,
        record_set: &RawRecordSet,
        backend: Option<&Arc<dyn ClassificationBackend>>,
    ) -> Vec<Finding> {
        let pending: Vec<PendingFinding<'_>> = record_set
            .eligible_rows()
            .map(|record| {
                let heuristic = severity::classify(&record.remarks);
                debug!(
                    "{}: heuristic {} (keyword: {:?})",
                    record.criterion_id, heuristic.severity, heuristic.matched_keyword
                );
                PendingFinding { record, heuristic }
            })
            .collect();

        let outcomes = self.orchestrator.evaluate(backend, &pending).await;

        pending
            .iter()
            .zip(outcomes)
            .map(|(item, outcome)| merge(item.record, &item.heuristic, outcome))
            .collect()
    }

    /// Configured backends and the registry's first choice, whatever this
    /// request selected.
    fn provider_summary(&self) -> ProviderSummaryInput {
        let registry = self.registry();
        ProviderSummaryInput {
            providers_configured: registry.ids(),
            preferred_provider: registry.preferred().map(|b| b.id().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, Severity};
    use crate::parsers::ParseError;
    use crate::providers::testing::FixedBackend;

    const REPORT: &str = r#"<html><body>
        <p>VPAT® Version 2.5</p>
        <p>Name of Product/Version: Widget Cloud 3</p>
        <p>Report Date: January 10, 2025</p>
        <table>
          <tr><th>Criteria</th><th>Conformance Level</th><th>Remarks and Explanations</th></tr>
          <tr><td>1.1.1 Non-text Content</td><td>Supports</td><td></td></tr>
          <tr><td>2.1.2 No Keyboard Trap</td><td>Does Not Support</td><td>Keyboard trap prevents closing modal</td></tr>
          <tr><td>1.4.3 Contrast (Minimum)</td><td>Partially Supports</td><td>Color contrast is insufficient for button text</td></tr>
          <tr><td>1.4.12 Text Spacing</td><td>Partially Supports</td><td>Minor inconsistent spacing</td></tr>
          <tr><td>1.2.1 Audio-only</td><td>Not Applicable</td><td></td></tr>
        </table>
    </body></html>"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 3).unwrap()
    }

    fn analyzer(backends: Vec<Arc<dyn ClassificationBackend>>) -> Analyzer {
        Analyzer::new(
            Arc::new(ProviderRegistry::new(backends)),
            OrchestratorSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_heuristic_only_scenarios() {
        let result = Analyzer::heuristic_only()
            .analyze_on("vpat.html", REPORT.as_bytes(), Some("vpat.html"), &ProviderSelection::Auto, today())
            .await
            .unwrap();
        let results = &result.analysis_results;

        assert_eq!(results.vpat_version, "2.5");
        assert_eq!(results.product_version, "Widget Cloud 3");
        assert_eq!(results.report_age, "8 months old");
        assert_eq!(results.summary.total(), 5);
        assert_eq!(results.summary.partially_supports, 2);

        let findings = &results.detailed_findings;
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].criterion, "2.1.2 No Keyboard Trap");
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[1].severity, Severity::High);
        assert_eq!(findings[2].severity, Severity::Low);
        for finding in findings {
            assert!(!finding.ai_corrected);
            assert_eq!(finding.provider_used, "none");
            assert_eq!(finding.confidence, Some(Confidence::Fallback));
        }

        assert!(results.ai_analysis_summary.providers_configured.is_empty());
        assert_eq!(results.ai_analysis_summary.preferred_provider, None);
    }

    #[tokio::test]
    async fn test_ai_correction_flows_through() {
        let analyzer = analyzer(vec![Arc::new(FixedBackend::with_rationale(
            "openai",
            Severity::High,
            "Spacing overrides break content.",
        ))]);
        let result = analyzer
            .analyze_on("vpat.html", REPORT.as_bytes(), Some("text/html"), &ProviderSelection::Auto, today())
            .await
            .unwrap();
        let results = &result.analysis_results;
        let findings = &results.detailed_findings;

        // Critical downgraded to High: a correction.
        assert!(findings[0].ai_corrected);
        assert_eq!(findings[0].original_severity, Some(Severity::Critical));
        // High confirmed: not a correction.
        assert!(!findings[1].ai_corrected);
        assert_eq!(findings[1].original_severity, None);
        // Low escalated to High.
        assert!(findings[2].ai_corrected);
        assert_eq!(findings[2].severity, Severity::High);
        assert_eq!(findings[2].original_severity, Some(Severity::Low));
        assert_eq!(findings[2].correction_reason, "Spacing overrides break content.");

        for finding in findings.iter().filter(|f| f.ai_corrected) {
            assert_ne!(finding.original_severity, Some(finding.severity));
        }

        assert_eq!(results.ai_analysis_summary.providers_used, vec!["openai"]);
        assert_eq!(results.ai_analysis_summary.preferred_provider.as_deref(), Some("openai"));
    }

    #[tokio::test]
    async fn test_backend_outage_still_succeeds() {
        let analyzer = analyzer(vec![Arc::new(FixedBackend::failing("gemini"))]);
        let result = analyzer
            .analyze_on("vpat.html", REPORT.as_bytes(), None, &ProviderSelection::Auto, today())
            .await
            .unwrap();
        let results = &result.analysis_results;

        for finding in &results.detailed_findings {
            assert_eq!(finding.provider_used, "none");
            assert_eq!(finding.confidence, Some(Confidence::Fallback));
            assert!(finding.correction_reason.starts_with("provider gemini unavailable"));
        }
        assert!(results.ai_analysis_summary.providers_used.is_empty());
        assert_eq!(results.ai_analysis_summary.providers_configured, vec!["gemini"]);
    }

    #[tokio::test]
    async fn test_disabled_selection_skips_backend() {
        let backend = Arc::new(FixedBackend::new("openai", Severity::Low, Confidence::Low));
        let shared: Arc<dyn ClassificationBackend> = backend.clone();
        let analyzer = analyzer(vec![shared]);

        let result = analyzer
            .analyze_on("vpat.html", REPORT.as_bytes(), None, &ProviderSelection::Disabled, today())
            .await
            .unwrap();

        assert_eq!(backend.calls(), 0);
        let summary = &result.analysis_results.ai_analysis_summary;
        assert_eq!(summary.preferred_provider.as_deref(), Some("openai"));
        assert!(summary.providers_used.is_empty());
        assert_eq!(
            result.analysis_results.detailed_findings[0].correction_reason,
            "no AI provider selected, used keyword analysis"
        );
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let err = Analyzer::heuristic_only()
            .analyze_on(
                "vpat.html",
                REPORT.as_bytes(),
                None,
                &ProviderSelection::Explicit("groq".to_string()),
                today(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ProviderNotAvailable { ref requested, .. } if requested == "groq"));
    }

    #[tokio::test]
    async fn test_parse_errors_propagate() {
        let err = Analyzer::heuristic_only()
            .analyze_on("notes.txt", b"hello", Some("notes.txt"), &ProviderSelection::Auto, today())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(ParseError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn test_preferred_provider_is_registry_first_choice() {
        let analyzer = analyzer(vec![
            Arc::new(FixedBackend::new("openai", Severity::High, Confidence::High)),
            Arc::new(FixedBackend::new("ollama", Severity::High, Confidence::Medium)),
        ]);

        let result = analyzer
            .analyze_on(
                "vpat.html",
                REPORT.as_bytes(),
                None,
                &ProviderSelection::Explicit("ollama".to_string()),
                today(),
            )
            .await
            .unwrap();

        let summary = &result.analysis_results.ai_analysis_summary;
        assert_eq!(summary.preferred_provider.as_deref(), Some("openai"));
        assert_eq!(summary.providers_used, vec!["ollama"]);
        assert_eq!(summary.providers_configured, vec!["openai", "ollama"]);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_analyze_future_is_send() {
        let analyzer = analyzer(vec![Arc::new(FixedBackend::new(
            "openai",
            Severity::High,
            Confidence::High,
        ))]);
        let selection = ProviderSelection::Auto;
        let future = analyzer.analyze("vpat.html", REPORT.as_bytes(), Some("vpat.html"), &selection);
        assert_send(&future);
    }

    #[tokio::test]
    async fn test_repeat_analysis_is_identical() {
        let analyzer = Analyzer::heuristic_only();
        let first = analyzer
            .analyze_on("vpat.html", REPORT.as_bytes(), None, &ProviderSelection::Auto, today())
            .await
            .unwrap();
        let second = analyzer
            .analyze_on("vpat.html", REPORT.as_bytes(), None, &ProviderSelection::Auto, today())
            .await
            .unwrap();
        assert_eq!(
            first.analysis_results.detailed_findings,
            second.analysis_results.detailed_findings
        );
    }
}
