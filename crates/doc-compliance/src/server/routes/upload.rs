//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::server::state::AppState;

/// Response for a stored upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub doc_id: String,
    pub filename: String,
}

/// Store the multipart `file` field as a new document
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let storage = &state.config().storage;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| Error::InvalidRequest("Missing filename".to_string()))?;

        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        if !filename.contains('.') || !storage.is_allowed_extension(&extension) {
            tracing::debug!("Upload rejected: unsupported extension for {}", filename);
            return Err(Error::UnsupportedFileType(extension));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidRequest(format!("Failed to read uploaded file: {}", e)))?;
        if data.len() > storage.max_file_size {
            tracing::debug!("Upload rejected: {} is {} bytes", filename, data.len());
            return Err(Error::FileTooLarge {
                size: data.len(),
                limit: storage.max_file_size,
            });
        }

        let stored = state.documents().store_upload(&filename, &data).await?;
        return Ok(Json(UploadResponse {
            doc_id: stored.doc_id,
            filename: stored.filename,
        }));
    }

    Err(Error::InvalidRequest("Missing 'file' field".to_string()))
}
