//! Severity-annotated findings.

use serde::{Deserialize, Serialize};

use super::record::ConformanceLevel;

/// Provider id recorded when no backend verdict was used.
pub const NO_PROVIDER: &str = "none";

/// Impact of an accessibility gap, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" | "moderate" => Some(Self::Medium),
            "low" | "minor" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much a severity assignment can be trusted.
///
/// `Fallback` marks findings where only the keyword heuristic ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Fallback,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Fallback => "fallback",
        }
    }

    /// Parse a backend-reported confidence. `fallback` is never accepted
    /// from a backend, and numeric scores are bucketed.
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "high" => Some(Self::High),
            "medium" | "moderate" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => s.parse::<f64>().ok().map(Self::from_score),
        }
    }

    fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::High
        } else if score >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final per-criterion output, with correction provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub criterion: String,
    pub level: ConformanceLevel,
    pub remarks: String,
    pub severity: Severity,
    /// Heuristic severity before an AI correction; `None` unless corrected.
    pub original_severity: Option<Severity>,
    pub ai_corrected: bool,
    pub confidence: Option<Confidence>,
    /// Backend id whose verdict was used, or `"none"`.
    pub provider_used: String,
    pub correction_reason: String,
    /// Keyword phrase that fired in the heuristic, if any.
    pub matched_keyword: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Medium < Severity::Low);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!(Severity::from_str(" HIGH "), Some(Severity::High));
        assert_eq!(Severity::from_str("moderate"), Some(Severity::Medium));
        assert_eq!(Severity::from_str("severe"), None);
    }

    #[test]
    fn test_confidence_from_str() {
        assert_eq!(Confidence::from_str("High"), Some(Confidence::High));
        assert_eq!(Confidence::from_str("0.92"), Some(Confidence::High));
        assert_eq!(Confidence::from_str("0.6"), Some(Confidence::Medium));
        assert_eq!(Confidence::from_str("0.1"), Some(Confidence::Low));
        assert_eq!(Confidence::from_str("fallback"), None);
        assert_eq!(Confidence::from_str("unsure"), None);
    }

    #[test]
    fn test_finding_serializes_null_original_severity() {
        let finding = Finding {
            criterion: "2.1.2 No Keyboard Trap".to_string(),
            level: ConformanceLevel::DoesNotSupport,
            remarks: "Keyboard trap in modal".to_string(),
            severity: Severity::Critical,
            original_severity: None,
            ai_corrected: false,
            confidence: Some(Confidence::Fallback),
            provider_used: NO_PROVIDER.to_string(),
            correction_reason: "no AI provider selected, used keyword analysis".to_string(),
            matched_keyword: Some("keyboard trap".to_string()),
        };

        let json = serde_json::to_value(&finding).unwrap();
        assert!(json["original_severity"].is_null());
        assert_eq!(json["level"], "Does Not Support");
        assert_eq!(json["severity"], "Critical");
        assert_eq!(json["confidence"], "fallback");
        assert_eq!(json["provider_used"], "none");
    }
}
