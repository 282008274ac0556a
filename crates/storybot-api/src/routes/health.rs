//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when story content cannot be read.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Number of stories available, when content could be read.
    pub stories: Option<usize>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let version = env!("CARGO_PKG_VERSION");
    match state.content.list_prologues().await {
        Ok(prologues) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                version,
                stories: Some(prologues.len()),
            }),
        ),
        Err(e) => {
            warn!(error = %e, "health check cannot read story content");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    version,
                    stories: None,
                }),
            )
        }
    }
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
