//! Ordered keyword rule table for the severity heuristic.
//!
//! Tiers are listed most severe first and the classifier stops at the first
//! tier with a match, so a phrase only needs to appear in one tier. Phrases are
//! regex fragments matched case-insensitively on word boundaries.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Severity;

/// Rule tiers in priority order. `Low` has no rule; it is the default.
pub const SEVERITY_RULES: &[(Severity, &[&str])] = &[
    (
        Severity::Critical,
        &[
            "keyboard trap",
            "trapped in",
            "not accessible by keyboard",
            "not keyboard accessible",
            "no keyboard access",
            "cannot be operated (?:with|by|using) (?:a |the )?keyboard",
            "blocks screen readers?",
            "not (?:accessible|available) to screen readers?",
            "inaccessible to screen readers?",
            "content disappears",
            "flash(?:es|ing)? more than three times",
            "seizures?",
        ],
    ),
    (
        Severity::High,
        &[
            "poor contrast",
            "low contrast",
            "insufficient (?:color |colour )?contrast",
            "contrast (?:is|are) (?:insufficient|too low|inadequate)",
            "difficult to use",
            "confusing navigation",
            "illogical (?:focus |reading )?order",
            "session time-?outs?",
            "missing (?:form )?labels?",
            "no (?:alt|alternative) text",
            "no captions?",
        ],
    ),
    (
        Severity::Medium,
        &[
            "inconsistent (?:navigation|identification|labels?|labelling|labeling|headings?)",
            "unclear link purpose",
            "status messages not announced",
            "some images (?:are )?missing alt",
            "missing headings?",
            "partial captions?",
            "reflow",
        ],
    ),
];

/// A compiled rule pattern with the phrase it was built from.
pub(super) struct CompiledPattern {
    pub severity: Severity,
    pub phrase: &'static str,
    pub regex: Regex,
}

/// Compiled rule table, flattened in priority order.
pub(super) static COMPILED_RULES: LazyLock<Vec<CompiledPattern>> = LazyLock::new(|| {
    SEVERITY_RULES
        .iter()
        .flat_map(|(severity, phrases)| {
            phrases.iter().map(move |phrase| CompiledPattern {
                severity: *severity,
                phrase,
                regex: Regex::new(&format!(r"(?i)\b(?:{})\b", phrase))
                    .unwrap_or_else(|e| panic!("invalid severity rule '{}': {}", phrase, e)),
            })
        })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        let total: usize = SEVERITY_RULES.iter().map(|(_, p)| p.len()).sum();
        assert_eq!(COMPILED_RULES.len(), total);
    }

    #[test]
    fn test_tiers_are_ordered_most_severe_first() {
        let tiers: Vec<Severity> = SEVERITY_RULES.iter().map(|(s, _)| *s).collect();
        let mut sorted = tiers.clone();
        sorted.sort();
        assert_eq!(tiers, sorted);
        assert!(!tiers.contains(&Severity::Low));
    }
}
