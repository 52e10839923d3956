//! Normalized records extracted from conformance reports.
//!
//! Every parser produces a `RawRecordSet`, regardless of the source format.
//! Downstream stages (classification, merge, aggregation) only ever see
//! these types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Support status of a single success criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConformanceLevel {
    #[serde(rename = "Supports")]
    Supports,
    #[serde(rename = "Partially Supports")]
    PartiallySupports,
    #[serde(rename = "Does Not Support")]
    DoesNotSupport,
    #[serde(rename = "Not Applicable")]
    NotApplicable,
}

impl ConformanceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supports => "Supports",
            Self::PartiallySupports => "Partially Supports",
            Self::DoesNotSupport => "Does Not Support",
            Self::NotApplicable => "Not Applicable",
        }
    }

    /// Parse a conformance level cell as written in a report.
    ///
    /// Matching is case-insensitive and tolerant of wrapped cells
    /// ("Partially\nSupports"). Order matters: "Does Not Support" and
    /// "Partially Supports" both contain "support".
    pub fn parse(cell: &str) -> Option<Self> {
        let normalized = cell
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        if normalized.is_empty() {
            return None;
        }
        if normalized.contains("partially support") {
            Some(Self::PartiallySupports)
        } else if normalized.contains("does not support") || normalized.contains("not supported")
        {
            Some(Self::DoesNotSupport)
        } else if normalized.contains("not applicable") || normalized == "n/a" {
            Some(Self::NotApplicable)
        } else if normalized.starts_with("support") {
            Some(Self::Supports)
        } else {
            None
        }
    }

    /// Whether records at this level get a severity assigned.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::PartiallySupports | Self::DoesNotSupport)
    }
}

impl std::fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single row of a conformance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCriterionRecord {
    /// Criterion identifier and name as written, e.g. "1.4.3 Contrast (Minimum)".
    pub criterion_id: String,
    pub conformance_level: ConformanceLevel,
    /// Free-text remarks, possibly empty.
    pub remarks: String,
}

impl RawCriterionRecord {
    pub fn new(
        criterion_id: impl Into<String>,
        conformance_level: ConformanceLevel,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            criterion_id: criterion_id.into(),
            conformance_level,
            remarks: remarks.into(),
        }
    }
}

/// Report-level metadata found while scanning document text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub vpat_version: Option<String>,
    pub product_version: Option<String>,
    pub report_date: Option<NaiveDate>,
    /// Text after the date label, kept even when it does not parse.
    pub report_date_raw: Option<String>,
}

/// Everything a parser extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecordSet {
    pub metadata: ReportMetadata,
    /// Criterion rows in document order.
    pub rows: Vec<RawCriterionRecord>,
}

impl RawRecordSet {
    pub fn new(metadata: ReportMetadata, rows: Vec<RawCriterionRecord>) -> Self {
        Self { metadata, rows }
    }

    /// Rows eligible for severity classification, in document order.
    pub fn eligible_rows(&self) -> impl Iterator<Item = &RawCriterionRecord> {
        self.rows
            .iter()
            .filter(|r| r.conformance_level.is_eligible())
    }
}
