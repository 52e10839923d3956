//! Parsing of backend replies into verdicts.

use serde::Deserialize;
use serde_json::Value;

use super::backend::{ProviderError, Verdict};
use crate::models::{Confidence, Severity};

#[derive(Debug, Deserialize)]
struct RawVerdict {
    severity: String,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default, alias = "reason", alias = "explanation")]
    rationale: Option<String>,
}

/// Parse a model reply containing a JSON verdict.
///
/// The JSON object may be wrapped in code fences or prose; everything from
/// the first `{` to the last `}` is parsed.
pub fn parse_verdict(reply: &str) -> Result<Verdict, ProviderError> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => {
            return Err(ProviderError::MalformedResponse(format!(
                "no JSON object in reply: {}",
                preview(reply)
            )))
        }
    };

    let raw: RawVerdict = serde_json::from_str(json)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid verdict JSON: {}", e)))?;

    let severity = Severity::from_str(&raw.severity).ok_or_else(|| {
        ProviderError::MalformedResponse(format!("unknown severity '{}'", raw.severity))
    })?;

    let confidence = match raw.confidence {
        Some(Value::String(s)) => Confidence::from_str(&s),
        Some(Value::Number(n)) => n.as_f64().and_then(|f| Confidence::from_str(&f.to_string())),
        _ => None,
    }
    .ok_or_else(|| ProviderError::MalformedResponse("missing or invalid confidence".to_string()))?;

    let rationale = raw
        .rationale
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Ok(Verdict {
        severity,
        confidence,
        rationale,
    })
}

fn preview(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(80) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
