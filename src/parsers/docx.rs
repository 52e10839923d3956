//! DOCX extraction from the WordprocessingML body.
//!
//! Only `word/document.xml` is read. Tables give the criterion rows;
//! paragraphs outside tables near the top of the document give metadata.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use zip::ZipArchive;

use super::columns::HeaderColumns;
use super::metadata::extract_metadata;
use super::{normalize_whitespace, ParseError};
use crate::models::{ConformanceLevel, RawCriterionRecord, RawRecordSet};

/// Leading body paragraphs scanned for metadata.
const METADATA_PARAGRAPHS: usize = 50;

static TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:tbl(?:\s[^>]*)?>.*?</w:tbl>").unwrap());
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:tr(?:\s[^>/]*)?>(.*?)</w:tr>").unwrap());
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:tc(?:\s[^>/]*)?>(.*?)</w:tc>").unwrap());
static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p(?:\s[^>/]*)?>(.*?)</w:p>").unwrap());
/// Text runs plus the tab and break elements that separate words.
static TEXT_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:(?:tab|br|cr)\b[^>]*/>").unwrap()
});

pub(super) fn parse_docx(bytes: &[u8]) -> Result<RawRecordSet, ParseError> {
    let xml = read_document_xml(bytes)?;

    let mut rows = Vec::new();
    for table in TABLE.find_iter(&xml) {
        collect_table_rows(table.as_str(), &mut rows);
    }

    let body_without_tables = TABLE.replace_all(&xml, "");
    let header_text = PARAGRAPH
        .captures_iter(&body_without_tables)
        .map(|caps| paragraph_text(&caps[1]))
        .filter(|text| !text.is_empty())
        .take(METADATA_PARAGRAPHS)
        .collect::<Vec<_>>()
        .join("\n");

    Ok(RawRecordSet::new(extract_metadata(&header_text), rows))
}

fn read_document_xml(bytes: &[u8]) -> Result<String, ParseError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ParseError::Corrupt(format!("not a DOCX container: {}", e)))?;

    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|_| ParseError::Corrupt("word/document.xml is missing".to_string()))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| ParseError::Corrupt(format!("unreadable word/document.xml: {}", e)))?;
    Ok(xml)
}

fn collect_table_rows(table_xml: &str, out: &mut Vec<RawCriterionRecord>) {
    let mut columns = HeaderColumns::positional();

    for row in ROW.captures_iter(table_xml) {
        let cells: Vec<String> = CELL
            .captures_iter(&row[1])
            .map(|cell| cell_text(&cell[1]))
            .collect();

        if let Some(header) = HeaderColumns::locate(&cells) {
            columns = header;
            continue;
        }
        if cells.len() < columns.width() {
            continue;
        }

        let criterion = &cells[columns.criteria];
        let Some(level) = ConformanceLevel::parse(&cells[columns.level]) else {
            debug!("Skipping DOCX row without conformance level: {}", criterion);
            continue;
        };
        if criterion.is_empty() {
            continue;
        }

        out.push(RawCriterionRecord::new(
            criterion.clone(),
            level,
            cells[columns.remarks].clone(),
        ));
    }
}

/// Cell text with paragraphs joined and whitespace collapsed.
fn cell_text(cell_xml: &str) -> String {
    let paragraphs: Vec<String> = PARAGRAPH
        .captures_iter(cell_xml)
        .map(|caps| paragraph_text(&caps[1]))
        .collect();
    normalize_whitespace(&paragraphs.join(" "))
}

fn paragraph_text(paragraph_xml: &str) -> String {
    let mut text = String::new();
    for caps in TEXT_RUN.captures_iter(paragraph_xml) {
        match caps.get(1) {
            Some(run) => text.push_str(&decode_entities(run.as_str())),
            None => text.push(' '),
        }
    }
    normalize_whitespace(&text)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#174;", "®")
        .replace("&amp;", "&")
}
