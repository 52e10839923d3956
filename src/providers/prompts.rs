//! Prompt sent to every classification backend.

use super::backend::CriterionContext;

/// Classification prompt. Placeholders: {criterion}, {level}, {heuristic}, {remarks}.
pub const CLASSIFICATION_PROMPT: &str = r#"You are an accessibility auditor reviewing a VPAT / Accessibility Conformance Report.

Assess the user impact of the gap described below and assign a severity:
- Critical: blocks access entirely for some users (keyboard traps, content unusable with a screen reader, seizure risk)
- High: major barrier that makes a task very difficult (poor contrast, missing labels, no captions)
- Medium: noticeable barrier with a workaround (inconsistent navigation, unclear link purpose)
- Low: minor issue with little impact

Success criterion: {criterion}
Conformance level: {level}
Keyword analysis suggested: {heuristic}
Vendor remarks:
"""
{remarks}
"""

Respond with ONLY a JSON object, no other text:
{"severity": "Critical|High|Medium|Low", "confidence": "high|medium|low", "rationale": "one sentence"}"#;

/// Maximum characters of remark text included in a prompt.
const MAX_REMARK_CHARS: usize = 4000;

/// Render the classification prompt for one criterion.
pub fn build_prompt(remarks: &str, context: &CriterionContext<'_>) -> String {
    CLASSIFICATION_PROMPT
        .replace("{criterion}", context.criterion)
        .replace("{level}", context.level.as_str())
        .replace("{heuristic}", context.heuristic.as_str())
        .replace("{remarks}", truncate(remarks.trim(), MAX_REMARK_CHARS))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
