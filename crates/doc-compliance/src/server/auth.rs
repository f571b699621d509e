//! `x-api-key` header check

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests without the configured API key; no key configured allows everyone
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if let Some(expected) = state.config().auth.api_key.as_deref() {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            tracing::debug!("Rejected {} {}: bad API key", request.method(), request.uri().path());
            return Err(Error::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}
