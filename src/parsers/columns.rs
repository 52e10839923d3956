//! Header recognition shared by the table-based extractors.

use super::normalize_whitespace;

const CRITERIA_ALIASES: &[&str] = &["criteria", "criterion", "success criterion", "success criteria"];
const LEVEL_ALIASES: &[&str] = &["conformance level", "level of support", "support level"];
const REMARKS_ALIASES: &[&str] = &["remarks", "remarks and explanations", "remarks & explanations"];

/// Positions of the three columns that make up a conformance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct HeaderColumns {
    pub criteria: usize,
    pub level: usize,
    pub remarks: usize,
}

impl HeaderColumns {
    /// Locate the columns in a header row by exact (normalized) alias match.
    pub fn locate<S: AsRef<str>>(cells: &[S]) -> Option<Self> {
        let position = |aliases: &[&str]| {
            cells
                .iter()
                .position(|cell| aliases.contains(&normalize_header(cell.as_ref()).as_str()))
        };

        Some(Self {
            criteria: position(CRITERIA_ALIASES)?,
            level: position(LEVEL_ALIASES)?,
            remarks: position(REMARKS_ALIASES)?,
        })
    }

    /// Positional fallback for headerless tables.
    pub fn positional() -> Self {
        Self {
            criteria: 0,
            level: 1,
            remarks: 2,
        }
    }

    /// Number of cells a data row needs to cover every column.
    pub fn width(&self) -> usize {
        self.criteria.max(self.level).max(self.remarks) + 1
    }
}

fn normalize_header(cell: &str) -> String {
    normalize_whitespace(cell)
        .to_lowercase()
        .trim_end_matches([':', '*'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_standard_header() {
        let cols = HeaderColumns::locate(&["Criteria", "Conformance Level", "Remarks and Explanations"])
            .unwrap();
        assert_eq!(cols, HeaderColumns::positional());
        assert_eq!(cols.width(), 3);
    }

    #[test]
    fn test_locate_reordered_and_wrapped() {
        let cols = HeaderColumns::locate(&[
            "Remarks:",
            "Success\n Criterion",
            "Level of Support",
        ])
        .unwrap();
        assert_eq!(cols.criteria, 1);
        assert_eq!(cols.level, 2);
        assert_eq!(cols.remarks, 0);
    }

    #[test]
    fn test_locate_requires_all_columns() {
        assert!(HeaderColumns::locate(&["Criteria", "Remarks"]).is_none());
        assert!(HeaderColumns::locate(&["Product", "Version", "Date"]).is_none());
    }

    #[test]
    fn test_alias_match_is_exact() {
        // A data cell that merely mentions a header word is not a header.
        assert!(HeaderColumns::locate(&[
            "1.4.3 Contrast criteria",
            "Supports",
            "Remarks follow"
        ])
        .is_none());
    }
}
