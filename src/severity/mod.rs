//! Deterministic keyword-based severity classification.
//!
//! This is the ground truth whenever no AI backend produces a usable verdict,
//! so it must never do I/O or depend on anything but its input.

mod rules;

pub use rules::SEVERITY_RULES;

use crate::models::Severity;
use rules::COMPILED_RULES;

/// Output of the keyword heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicResult {
    pub severity: Severity,
    /// Rule phrase that fired; `None` when the default applied.
    pub matched_keyword: Option<&'static str>,
}

impl HeuristicResult {
    fn default_low() -> Self {
        Self {
            severity: Severity::Low,
            matched_keyword: None,
        }
    }
}

/// Classify remark text by strict rule priority.
///
/// The first tier (Critical, then High, then Medium) with any matching phrase
/// wins. No match, or empty remarks, yields `Low`.
pub fn classify(remarks: &str) -> HeuristicResult {
    if remarks.trim().is_empty() {
        return HeuristicResult::default_low();
    }

    COMPILED_RULES
        .iter()
        .find(|rule| rule.regex.is_match(remarks))
        .map(|rule| HeuristicResult {
            severity: rule.severity,
            matched_keyword: Some(rule.phrase),
        })
        .unwrap_or_else(HeuristicResult::default_low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_remarks_are_low() {
        assert_eq!(classify("").severity, Severity::Low);
        assert_eq!(classify("   \n ").severity, Severity::Low);
        assert_eq!(classify("").matched_keyword, None);
    }

    #[test]
    fn test_keyboard_trap_is_critical() {
        let result = classify("Keyboard trap prevents closing modal");
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.matched_keyword, Some("keyboard trap"));
    }

    #[test]
    fn test_insufficient_contrast_is_high() {
        let result = classify("Color contrast is insufficient for button text");
        assert_eq!(result.severity, Severity::High);
        assert!(result.matched_keyword.is_some());
    }

    #[test]
    fn test_unmatched_remark_defaults_low() {
        let result = classify("Minor inconsistent spacing");
        assert_eq!(result.severity, Severity::Low);
        assert_eq!(result.matched_keyword, None);
    }

    #[test]
    fn test_medium_keyword() {
        let result = classify("Link text has unclear link purpose in the footer");
        assert_eq!(result.severity, Severity::Medium);
    }

    #[test]
    fn test_critical_wins_over_lower_tiers() {
        let remarks = [
            "Poor contrast and a keyboard trap in the date picker",
            "Inconsistent navigation; the carousel is not accessible by keyboard",
            "Unclear link purpose, session timeouts, and content disappears on zoom",
        ];
        for remark in remarks {
            assert_eq!(classify(remark).severity, Severity::Critical, "{}", remark);
        }
    }

    #[test]
    fn test_high_wins_over_medium() {
        let result = classify("Inconsistent navigation and poor contrast on links");
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.matched_keyword, Some("poor contrast"));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("KEYBOARD TRAP").severity, Severity::Critical);
        assert_eq!(classify("Session Timeout warnings").severity, Severity::High);
    }

    #[test]
    fn test_word_boundaries() {
        // "reflowing" must not trigger the "reflow" rule.
        assert_eq!(classify("Text reflowing works").severity, Severity::Low);
        assert_eq!(classify("Content does not reflow").severity, Severity::Medium);
    }

    #[test]
    fn test_deterministic() {
        let remark = "Focus order is illogical order in forms";
        assert_eq!(classify(remark), classify(remark));
    }
}
