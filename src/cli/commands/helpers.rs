//! Shared helper functions for CLI commands.

use console::{style, StyledObject};

use crate::models::Severity;

/// Truncate a string to at most `max_chars` characters, adding "..." when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Severity label colored by impact.
pub fn severity_label(severity: Severity) -> StyledObject<String> {
    let label = format!("{:<8}", severity.as_str());
    match severity {
        Severity::Critical => style(label).red().bold(),
        Severity::High => style(label).red(),
        Severity::Medium => style(label).yellow(),
        Severity::Low => style(label).dim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Keyboard trap prevents closing modal", 16), "Keyboard trap...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }
}
