//! HTTP read API.
//!
//! The surface is deliberately small and read-only: the latest snapshot as
//! JSON, a health endpoint, and the persisted data files served as static
//! content. All writes happen on the capture thread.

use std::path::Path;
use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use time::OffsetDateTime;
use tower_http::services::ServeDir;

use hygrolog_types::Reading;

use crate::state::AppState;

/// Create the API router.
///
/// `data_dir` is the directory holding the persisted JSON files; it is
/// exposed verbatim under `/data` (e.g. `/data/data.json`).
pub fn router(data_dir: &Path) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/latest", get(get_latest))
        .nest_service("/data", ServeDir::new(data_dir))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        started_at: state.started_at(),
    })
}

/// The latest reading, or 404 before the first successful capture.
async fn get_latest(State(state): State<Arc<AppState>>) -> Result<Json<Reading>, StatusCode> {
    state.latest().map(Json).ok_or(StatusCode::NOT_FOUND)
}
