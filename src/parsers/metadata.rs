//! Report metadata scanning (VPAT version, product name, report date).

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::ReportMetadata;

static VPAT_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bVPAT\s*(?:®|&reg;|\(R\))?\s*Version\s*:?\s*(\d+(?:\.\d+)*)")
        .expect("valid VPAT version regex")
});

static PRODUCT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\bName\s+of\s+(?:the\s+)?Product(?:\s*/\s*Version)?\s*:?[ \t]*(.*)$")
        .expect("valid product name regex")
});

static REPORT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:Report\s+)?Date\s*:?\s*([A-Za-z]{3,9}\.?\s+\d{1,2}\s*,\s*\d{4}|\d{4}-\d{2}-\d{2})",
    )
    .expect("valid report date regex")
});

static DATE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:Report\s+)?Date\s*:[ \t]*(\S.*?)\s*$")
        .expect("valid date label regex")
});

static SEPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSept\b").expect("valid month regex"));

const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d"];

/// Scan document text for report metadata. Missing fields stay `None`.
pub fn extract_metadata(text: &str) -> ReportMetadata {
    let vpat_version = VPAT_VERSION
        .captures(text)
        .map(|caps| caps[1].to_string());

    let product_version = PRODUCT_NAME
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .find(|value| !value.is_empty());

    let dated = REPORT_DATE.captures_iter(text).find_map(|caps| {
        let raw = caps[1].trim().to_string();
        parse_report_date(&raw).map(|date| (raw, date))
    });
    let (report_date_raw, report_date) = match dated {
        Some((raw, date)) => (Some(raw), Some(date)),
        None => (
            DATE_LABEL.captures(text).map(|caps| caps[1].to_string()),
            None,
        ),
    };

    ReportMetadata {
        vpat_version,
        product_version,
        report_date,
        report_date_raw,
    }
}

/// Parse a long or abbreviated month date ("March 3, 2024", "Mar. 3, 2024",
/// "Sept. 3, 2024") or an ISO date.
pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = SEPT
        .replace_all(raw, "Sep")
        .replace('.', "")
        .replace(',', ", ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" ,", ",");

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
}
