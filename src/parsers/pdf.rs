//! PDF extraction via pdftotext layout mode.
//!
//! pdftotext `-layout` preserves column alignment, so a conformance table
//! comes out as fixed-width text. Tables are located by their header line;
//! the header's column offsets then assign each text segment of the
//! following lines to a column. A logical row starts on a line carrying a
//! criterion number or a conformance level, and wrapped lines are appended
//! to the open row.

use std::io::Write;
use std::sync::LazyLock;

use regex::Regex;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

use super::metadata::extract_metadata;
use super::{normalize_whitespace, ParseError};
use crate::models::{ConformanceLevel, RawCriterionRecord, RawRecordSet};

/// Segment start may sit this many columns left of its header.
const COLUMN_TOLERANCE: usize = 2;

/// A table is kept when at least this percentage of its rows are well-formed.
const MIN_WELL_FORMED_PERCENT: usize = 60;

/// Text runs separated by two or more spaces.
static SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+(?: \S+)*").unwrap());

/// "1.4.3", "302.1", "E205.4", "501.1"...
static CRITERION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{0,2}\d+(?:\.\d+)+\b").unwrap());

static PAGE_FOOTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^page\s+\d+(?:\s+of\s+\d+)?$").unwrap());

pub(super) async fn parse_pdf(bytes: &[u8]) -> Result<RawRecordSet, ParseError> {
    let text = pdf_to_layout_text(bytes).await?;
    let rows = parse_layout_text(&text);
    Ok(RawRecordSet::new(extract_metadata(&text), rows))
}

async fn pdf_to_layout_text(bytes: &[u8]) -> Result<String, ParseError> {
    let head = &bytes[..bytes.len().min(1024)];
    if !head.windows(5).any(|w| w == b"%PDF-") {
        return Err(ParseError::Corrupt("missing PDF header".to_string()));
    }

    let mut file = NamedTempFile::new()?;
    file.write_all(bytes)?;
    file.flush()?;

    let result = Command::new("pdftotext")
        .args(["-layout", "-enc", "UTF-8"])
        .arg(file.path())
        .arg("-")
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ParseError::Extraction(format!(
                "pdftotext failed: {}",
                stderr.trim()
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ParseError::ToolNotFound(
            "pdftotext (install poppler-utils)".to_string(),
        )),
        Err(e) => Err(ParseError::Io(e)),
    }
}

/// Character offsets of the three table columns, from a header line.
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    starts: [usize; 3],
}

impl ColumnLayout {
    fn from_header(line: &str) -> Option<Self> {
        let lower = line.to_lowercase();
        let col = |needle: &str| lower.find(needle).map(|byte| lower[..byte].chars().count());

        let criteria = col("criteria").or_else(|| col("criterion"))?;
        let level = col("conformance level")
            .or_else(|| col("level of support"))
            .or_else(|| col("support level"))?;
        let remarks = col("remarks")?;

        (criteria < level && level < remarks).then_some(Self {
            starts: [criteria, level, remarks],
        })
    }

    /// Column index for a segment beginning at character offset `start`.
    fn column_for(&self, start: usize) -> usize {
        self.starts
            .iter()
            .rposition(|&col| col <= start + COLUMN_TOLERANCE)
            .unwrap_or(0)
    }

    /// Split a line into per-column text.
    fn split(&self, line: &str) -> [String; 3] {
        let mut cells: [String; 3] = Default::default();
        for segment in SEGMENT.find_iter(line) {
            let start = line[..segment.start()].chars().count();
            append(&mut cells[self.column_for(start)], segment.as_str());
        }
        cells
    }
}

fn append(cell: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !cell.is_empty() {
        cell.push(' ');
    }
    cell.push_str(text);
}

/// A table row being assembled from one or more lines.
#[derive(Debug, Default)]
struct PendingRow {
    cells: [String; 3],
}

impl PendingRow {
    fn awaiting_level(&self) -> bool {
        ConformanceLevel::parse(&self.cells[1]).is_none()
    }

    fn extend(&mut self, cells: [String; 3]) {
        for (cell, text) in self.cells.iter_mut().zip(cells) {
            append(cell, &text);
        }
    }

    fn into_record(self) -> Option<RawCriterionRecord> {
        let [criterion, level, remarks] = self.cells;
        let criterion = normalize_whitespace(&criterion);
        if criterion.is_empty() {
            return None;
        }
        let level = ConformanceLevel::parse(&level)?;
        Some(RawCriterionRecord::new(
            criterion,
            level,
            normalize_whitespace(&remarks),
        ))
    }
}

/// One table in progress.
struct TableBuilder {
    layout: ColumnLayout,
    rows: Vec<PendingRow>,
    /// A blank line or page break closed the current row to continuations.
    gap: bool,
}

impl TableBuilder {
    fn new(layout: ColumnLayout) -> Self {
        Self {
            layout,
            rows: Vec::new(),
            gap: false,
        }
    }

    fn feed(&mut self, line: &str) {
        let cells = self.layout.split(line);
        let starts_criterion = CRITERION_ID.is_match(&cells[0]);
        let has_level = ConformanceLevel::parse(&cells[1]).is_some();
        let gap = std::mem::replace(&mut self.gap, false);
        let open_awaits_level = self.rows.last().is_some_and(PendingRow::awaiting_level);

        if has_level && !starts_criterion && !gap && open_awaits_level {
            // Level (or the rest of a wrapped level) for the open row.
            if let Some(open) = self.rows.last_mut() {
                open.extend(cells);
            }
        } else if starts_criterion || has_level {
            self.rows.push(PendingRow { cells });
        } else if let Some(open) = self.rows.last_mut().filter(|_| !gap) {
            open.extend(cells);
        } else {
            debug!("Skipping stray table line: {}", line.trim());
        }
    }

    fn finish(self, out: &mut Vec<RawCriterionRecord>) {
        let total = self.rows.len();
        if total == 0 {
            return;
        }

        let records: Vec<_> = self
            .rows
            .into_iter()
            .filter_map(PendingRow::into_record)
            .collect();

        if records.len() * 100 >= total * MIN_WELL_FORMED_PERCENT {
            out.extend(records);
        } else {
            warn!(
                "Discarding PDF table: only {} of {} rows well-formed",
                records.len(),
                total
            );
        }
    }
}

/// Extract criterion rows from pdftotext layout output.
pub fn parse_layout_text(text: &str) -> Vec<RawCriterionRecord> {
    let mut records = Vec::new();
    let mut table: Option<TableBuilder> = None;

    for raw_line in text.lines() {
        let page_break = raw_line.contains('\u{c}');
        let line = raw_line.replace('\u{c}', "");

        if let Some(layout) = ColumnLayout::from_header(&line) {
            if let Some(done) = table.take() {
                done.finish(&mut records);
            }
            table = Some(TableBuilder::new(layout));
            continue;
        }

        let Some(current) = table.as_mut() else {
            continue;
        };

        if page_break {
            current.gap = true;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            current.gap = true;
            continue;
        }
        if PAGE_FOOTER.is_match(trimmed) {
            continue;
        }

        current.feed(&line);
    }

    if let Some(done) = table {
        done.finish(&mut records);
    }

    records
}
