//! Original and fixed document downloads

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::StoredDocument;

use super::require_document;

/// Download the uploaded file
pub async fn download_original(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Response> {
    let document = require_document(&state, &doc_id).await?;
    file_response(&document).await
}

/// Download the derived fixed file
pub async fn download_fixed(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Response> {
    let document = state
        .documents()
        .resolve_derived_document(&doc_id)
        .await?
        .ok_or_else(|| Error::DocumentNotFound(format!("{} (fixed)", doc_id)))?;
    file_response(&document).await
}

async fn file_response(document: &StoredDocument) -> Result<Response> {
    let data = tokio::fs::read(&document.path).await?;
    let content_type = mime_guess::from_path(&document.path)
        .first_or_octet_stream()
        .to_string();
    let disposition = format!("attachment; filename=\"{}\"", document.filename);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}
