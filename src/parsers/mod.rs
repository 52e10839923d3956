//! Conformance report extraction.
//!
//! Three independent extractors normalize reports into a `RawRecordSet`:
//! - PDF: layout text from pdftotext (Poppler), tables located by column headers
//! - DOCX: WordprocessingML tables read straight from the zip container
//! - HTML: `<table>` elements located by header cell text
//!
//! The document kind is resolved once, from a declared type (file name,
//! extension or MIME type) or by sniffing the bytes.

mod columns;
mod docx;
mod html;
mod metadata;
mod pdf;

pub use metadata::extract_metadata;
pub use pdf::parse_layout_text;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::RawRecordSet;

const MIME_PDF: &str = "application/pdf";
const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const MIME_HTML: &str = "text/html";

/// Errors that can occur while extracting a report.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported document type: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt document: {0}")]
    Corrupt(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("No conformance table rows found in {0} document")]
    NoRecords(DocumentKind),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Whether the document type itself was rejected (as opposed to its content).
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, ParseError::UnsupportedFormat(_))
    }
}

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Html,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Html => "html",
        }
    }

    /// Resolve a declared type: a MIME type, a bare extension or a file name.
    pub fn from_declared(declared: &str) -> Option<Self> {
        let declared = declared.trim().to_lowercase();

        if declared.contains('/') {
            let mime = declared.split(';').next().unwrap_or("").trim();
            return match mime {
                MIME_PDF => Some(DocumentKind::Pdf),
                MIME_DOCX => Some(DocumentKind::Docx),
                MIME_HTML | "application/xhtml+xml" => Some(DocumentKind::Html),
                _ => None,
            };
        }

        let ext = declared.rsplit('.').next().unwrap_or("");
        match ext {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "html" | "htm" | "xhtml" => Some(DocumentKind::Html),
            _ => None,
        }
    }

    /// Guess the kind from content.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if let Some(kind) = infer::get(bytes).and_then(|t| Self::from_declared(t.mime_type())) {
            return Some(kind);
        }

        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]).to_lowercase();
        let head = head.trim_start_matches('\u{feff}').trim_start();
        if head.starts_with("<!doctype html") || head.starts_with("<html") {
            return Some(DocumentKind::Html);
        }
        None
    }

    /// Resolve the kind from a declared type, falling back to sniffing only
    /// when nothing was declared.
    pub fn detect(declared: Option<&str>, bytes: &[u8]) -> Result<Self, ParseError> {
        match declared.map(str::trim).filter(|d| !d.is_empty()) {
            Some(declared) => Self::from_declared(declared)
                .ok_or_else(|| ParseError::UnsupportedFormat(declared.to_string())),
            None => Self::sniff(bytes).ok_or_else(|| {
                ParseError::UnsupportedFormat("unrecognized document content".to_string())
            }),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a report whose type is declared (or sniffed when `declared_type` is `None`).
pub async fn parse(bytes: &[u8], declared_type: Option<&str>) -> Result<RawRecordSet, ParseError> {
    let kind = DocumentKind::detect(declared_type, bytes)?;
    parse_as(bytes, kind).await
}

/// Parse a report of a known kind.
pub async fn parse_as(bytes: &[u8], kind: DocumentKind) -> Result<RawRecordSet, ParseError> {
    debug!("Parsing {} bytes as {}", bytes.len(), kind);

    let record_set = match kind {
        DocumentKind::Pdf => pdf::parse_pdf(bytes).await?,
        DocumentKind::Docx => docx::parse_docx(bytes)?,
        DocumentKind::Html => html::parse_html(bytes)?,
    };

    if record_set.rows.is_empty() {
        return Err(ParseError::NoRecords(kind));
    }

    info!(
        "Extracted {} criterion rows from {} document",
        record_set.rows.len(),
        kind
    );
    Ok(record_set)
}

/// Collapse runs of whitespace (including wrapped lines) to single spaces.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
