//! Agent job endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::Job;

/// Request to start an agent job
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub doc_id: String,
    pub goal: String,
}

/// Response for a created job
#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: Uuid,
}

/// Start a job for an uploaded document
pub async fn create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<Json<CreateJobResponse>> {
    if request.goal.trim().is_empty() {
        return Err(Error::InvalidRequest("goal must not be empty".to_string()));
    }
    if !state.documents().document_exists(&request.doc_id).await? {
        return Err(Error::DocumentNotFound(request.doc_id));
    }

    let job_id = state
        .orchestrator()
        .create_job(&request.doc_id, &request.goal)
        .await?;
    Ok(Json(CreateJobResponse { job_id }))
}

/// Get a job record
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>> {
    let id = Uuid::parse_str(&job_id).map_err(|_| Error::JobNotFound(job_id.clone()))?;
    let job = state
        .orchestrator()
        .get_job(id)
        .await?
        .ok_or(Error::JobNotFound(job_id))?;
    Ok(Json(job))
}

/// List all job records
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>> {
    Ok(Json(state.orchestrator().list_jobs().await?))
}
