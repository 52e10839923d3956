//! HTML extraction with scraper.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::columns::HeaderColumns;
use super::metadata::extract_metadata;
use super::{normalize_whitespace, ParseError};
use crate::models::{ConformanceLevel, RawCriterionRecord, RawRecordSet};

const TEXT_BLOCKS: &str = "title, h1, h2, h3, h4, h5, h6, p, li, dt, dd, th, td, caption";

struct Selectors {
    table: Selector,
    row: Selector,
    text_block: Selector,
}

impl Selectors {
    fn new() -> Result<Self, ParseError> {
        Ok(Self {
            table: selector("table")?,
            row: selector("tr")?,
            text_block: selector(TEXT_BLOCKS)?,
        })
    }
}

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css)
        .map_err(|e| ParseError::Extraction(format!("invalid selector '{}': {}", css, e)))
}

pub(super) fn parse_html(bytes: &[u8]) -> Result<RawRecordSet, ParseError> {
    let selectors = Selectors::new()?;
    let source = String::from_utf8_lossy(bytes);
    let document = Html::parse_document(&source);

    let mut rows = Vec::new();
    for table in document.select(&selectors.table) {
        collect_table_rows(table, &selectors, &mut rows);
    }

    let text = document
        .select(&selectors.text_block)
        .map(element_text)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(RawRecordSet::new(extract_metadata(&text), rows))
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn belongs_to(row: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .is_some_and(|owner| owner.id() == table.id())
}

fn collect_table_rows(
    table: ElementRef<'_>,
    selectors: &Selectors,
    out: &mut Vec<RawCriterionRecord>,
) {
    let mut columns: Option<HeaderColumns> = None;

    // Rows of nested tables belong to the nested table alone.
    for row in table
        .select(&selectors.row)
        .filter(|row| belongs_to(*row, table))
    {
        let cells: Vec<String> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| matches!(cell.value().name(), "td" | "th"))
            .map(element_text)
            .collect();

        if let Some(header) = HeaderColumns::locate(&cells) {
            columns = Some(header);
            continue;
        }
        // Rows before the header row belong to no conformance table.
        let Some(cols) = columns else {
            continue;
        };
        if cells.len() < cols.width() {
            continue;
        }

        let criterion = &cells[cols.criteria];
        match ConformanceLevel::parse(&cells[cols.level]) {
            Some(level) if !criterion.is_empty() => out.push(RawCriterionRecord::new(
                criterion.clone(),
                level,
                cells[cols.remarks].clone(),
            )),
            _ => debug!("Skipping HTML row: {:?}", cells),
        }
    }
}
