//! HTTP routes for the document compliance server

pub mod agent;
pub mod download;
pub mod report;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::server::{auth, state::AppState};
use crate::types::StoredDocument;

/// Build all routes
///
/// Document routes sit behind the API key check; health and agent job routes do not.
pub fn router(state: AppState) -> Router {
    let max_body_size = state.config().server.max_body_size;

    let documents = Router::new()
        .route(
            "/upload",
            post(upload::upload_document).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/report/:doc_id", get(report::get_report))
        .route("/fix/:doc_id", post(report::fix_document))
        .route("/download/original/:doc_id", get(download::download_original))
        .route("/download/fixed/:doc_id", get(download::download_fixed))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .merge(documents)
        .route("/agent/jobs", post(agent::create_job).get(agent::list_jobs))
        .route("/agent/jobs/:job_id", get(agent::get_job))
        .with_state(state)
}

/// Resolve an uploaded document or fail with not found
pub(crate) async fn require_document(state: &AppState, doc_id: &str) -> Result<StoredDocument> {
    state
        .documents()
        .resolve_document(doc_id)
        .await?
        .ok_or_else(|| Error::DocumentNotFound(doc_id.to_string()))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Document compliance API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready while the document store can serve files
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.documents().health_check().await {
        Ok(true) => StatusCode::OK,
        Ok(false) => StatusCode::SERVICE_UNAVAILABLE,
        Err(e) => {
            tracing::warn!("Document store health check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
