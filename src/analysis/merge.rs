//! Combines the heuristic result and the backend outcome into a finding.

use crate::models::{Confidence, Finding, RawCriterionRecord, NO_PROVIDER};
use crate::severity::HeuristicResult;

use super::orchestrator::AiOutcome;

pub const REASON_AI_CORRECTED: &str = "AI reassessed severity based on remark content";
pub const REASON_AI_CONFIRMED: &str = "AI confirmed keyword analysis";
pub const REASON_NO_PROVIDER: &str = "no AI provider selected, used keyword analysis";

/// Build the final finding for one eligible record.
pub fn merge(record: &RawCriterionRecord, heuristic: &HeuristicResult, outcome: AiOutcome) -> Finding {
    let mut finding = Finding {
        criterion: record.criterion_id.clone(),
        level: record.conformance_level,
        remarks: record.remarks.clone(),
        severity: heuristic.severity,
        original_severity: None,
        ai_corrected: false,
        confidence: Some(Confidence::Fallback),
        provider_used: NO_PROVIDER.to_string(),
        correction_reason: REASON_NO_PROVIDER.to_string(),
        matched_keyword: heuristic.matched_keyword.map(str::to_string),
    };

    match outcome {
        AiOutcome::NotRequested => {}
        AiOutcome::Failed { provider, error } => {
            finding.correction_reason = format!(
                "provider {} unavailable ({}), used keyword analysis",
                provider, error
            );
        }
        AiOutcome::Verdict { provider, verdict } => {
            let corrected = verdict.severity != heuristic.severity;
            let default_reason = if corrected {
                REASON_AI_CORRECTED
            } else {
                REASON_AI_CONFIRMED
            };

            finding.severity = verdict.severity;
            finding.ai_corrected = corrected;
            finding.original_severity = corrected.then_some(heuristic.severity);
            finding.confidence = Some(verdict.confidence);
            finding.provider_used = provider;
            finding.correction_reason = verdict
                .rationale
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| default_reason.to_string());
        }
    }

    finding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConformanceLevel, Severity};
    use crate::providers::{ProviderError, Verdict};
    use crate::severity::classify;

    fn record(remarks: &str) -> RawCriterionRecord {
        RawCriterionRecord::new("1.3.1 Info and Relationships", ConformanceLevel::PartiallySupports, remarks)
    }

    fn verdict(severity: Severity, rationale: Option<&str>) -> AiOutcome {
        AiOutcome::Verdict {
            provider: "openai".to_string(),
            verdict: Verdict {
                severity,
                confidence: Confidence::High,
                rationale: rationale.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_no_provider_uses_heuristic() {
        let rec = record("Keyboard trap prevents closing modal");
        let finding = merge(&rec, &classify(&rec.remarks), AiOutcome::NotRequested);

        assert_eq!(finding.severity, Severity::Critical);
        assert!(!finding.ai_corrected);
        assert_eq!(finding.original_severity, None);
        assert_eq!(finding.confidence, Some(Confidence::Fallback));
        assert_eq!(finding.provider_used, "none");
        assert_eq!(finding.correction_reason, REASON_NO_PROVIDER);
        assert_eq!(finding.matched_keyword.as_deref(), Some("keyboard trap"));
    }

    #[test]
    fn test_ai_correction_records_provenance() {
        // Heuristic says Low; the backend escalates to High.
        let rec = record("Tables use layout markup without headers");
        let heuristic = classify(&rec.remarks);
        assert_eq!(heuristic.severity, Severity::Low);

        let finding = merge(
            &rec,
            &heuristic,
            verdict(Severity::High, Some("Data tables lack header associations.")),
        );
        assert_eq!(finding.severity, Severity::High);
        assert!(finding.ai_corrected);
        assert_eq!(finding.original_severity, Some(Severity::Low));
        assert_eq!(finding.confidence, Some(Confidence::High));
        assert_eq!(finding.provider_used, "openai");
        assert_eq!(finding.correction_reason, "Data tables lack header associations.");
    }

    #[test]
    fn test_ai_correction_without_rationale_uses_default() {
        let rec = record("Tables use layout markup");
        let finding = merge(&rec, &classify(&rec.remarks), verdict(Severity::Medium, Some("   ")));
        assert!(finding.ai_corrected);
        assert_eq!(finding.correction_reason, REASON_AI_CORRECTED);
    }

    #[test]
    fn test_ai_agreement_is_not_a_correction() {
        let rec = record("Poor contrast on links");
        let finding = merge(&rec, &classify(&rec.remarks), verdict(Severity::High, None));
        assert_eq!(finding.severity, Severity::High);
        assert!(!finding.ai_corrected);
        assert_eq!(finding.original_severity, None);
        assert_eq!(finding.confidence, Some(Confidence::High));
        assert_eq!(finding.provider_used, "openai");
        assert_eq!(finding.correction_reason, REASON_AI_CONFIRMED);
    }

    #[test]
    fn test_failed_call_falls_back() {
        let rec = record("Poor contrast on links");
        let outcome = AiOutcome::Failed {
            provider: "gemini".to_string(),
            error: ProviderError::RateLimited("gemini".to_string()),
        };
        let finding = merge(&rec, &classify(&rec.remarks), outcome);

        assert_eq!(finding.severity, Severity::High);
        assert!(!finding.ai_corrected);
        assert_eq!(finding.confidence, Some(Confidence::Fallback));
        assert_eq!(finding.provider_used, "none");
        assert_eq!(
            finding.correction_reason,
            "provider gemini unavailable (Rate limited by gemini), used keyword analysis"
        );
    }
}
