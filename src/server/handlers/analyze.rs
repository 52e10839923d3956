//! Report upload and analysis.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::IntoResponse,
    Json,
};
use tracing::{debug, info};

use super::super::{error::ApiError, AppState};
use crate::analysis::ProviderSelection;
use crate::parsers::DocumentKind;

const OCTET_STREAM: &str = "application/octet-stream";

/// An uploaded document.
struct Upload {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl Upload {
    /// The file name wins when it names a known type. The part's content type
    /// is consulted next; a generic `application/octet-stream` is ignored.
    fn declared_type(&self) -> Option<&str> {
        let name = Some(self.filename.trim()).filter(|n| !n.is_empty());
        let hint = self
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty() && !ct.eq_ignore_ascii_case(OCTET_STREAM));

        let recognized = |declared: &&str| DocumentKind::from_declared(declared).is_some();
        if let Some(declared) = name.filter(recognized).or(hint.filter(recognized)) {
            return Some(declared);
        }

        // Nothing recognizable: reject by extension, else by content type,
        // else leave it to sniffing.
        name.filter(|n| n.contains('.')).or(hint)
    }
}

/// Analyze an uploaded report (`file` field, optional `provider` field).
pub async fn analyze_report(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart?;
    let mut upload: Option<Upload> = None;
    let mut provider: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?.to_vec();
                debug!(
                    "Received upload {:?} ({:?}, {} bytes)",
                    filename,
                    content_type,
                    bytes.len()
                );
                upload = Some(Upload {
                    filename,
                    content_type,
                    bytes,
                });
            }
            Some("provider") => provider = Some(field.text().await?),
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    let selection = ProviderSelection::parse(provider.as_deref());
    info!(
        "Analyze request for {:?} (provider: {})",
        upload.filename, selection
    );

    let result = state
        .analyzer
        .analyze(
            &upload.filename,
            &upload.bytes,
            upload.declared_type(),
            &selection,
        )
        .await?;

    Ok(Json(result))
}
