//! Compliance report and synchronous fix endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::ComplianceReport;

use super::require_document;

/// Response for a synchronous fix
#[derive(Debug, Serialize)]
pub struct FixResponse {
    pub doc_id: String,
    pub fixed_filename: String,
}

/// Analyze a document's text
pub async fn get_report(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<ComplianceReport>> {
    let document = require_document(&state, &doc_id).await?;
    let text = state.extractor().extract_text(&document.path).await?;

    let report = state
        .compliance()
        .analyze(&text, Some(doc_id.as_str()), Some(document.filename.as_str()))
        .await;
    Ok(Json(report))
}

/// Rewrite a document and save the result as its fixed copy
pub async fn fix_document(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<FixResponse>> {
    let document = require_document(&state, &doc_id).await?;
    let text = state.extractor().extract_text(&document.path).await?;

    let corrected = state.rewriter().rewrite_text(&text).await?;
    let saved = state
        .documents()
        .save_derived_document(&doc_id, &corrected)
        .await?;

    Ok(Json(FixResponse {
        doc_id,
        fixed_filename: saved.filename,
    }))
}
