//! Input file and result listings
//!
//! GET /api/files, GET /api/results

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::ApiResult;
use crate::services::input_files::{list_audio_files, InputFile};
use crate::services::results_store::ResultSummary;
use crate::AppState;

/// GET /api/files response
#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<InputFile>,
    pub count: usize,
}

/// GET /api/results response
#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub results: Vec<ResultSummary>,
    pub count: usize,
}

/// GET /api/files
///
/// Supported audio files in the input folder.
pub async fn list_input_files(State(state): State<AppState>) -> ApiResult<Json<FilesResponse>> {
    let files = list_audio_files(&state.input_dir).await.map_err(|e| {
        tracing::error!(error = %e, "Error listing files");
        e
    })?;

    Ok(Json(FilesResponse {
        count: files.len(),
        files,
    }))
}

/// GET /api/results
///
/// Summaries of persisted results.
pub async fn list_results(State(state): State<AppState>) -> ApiResult<Json<ResultsResponse>> {
    let results = state.results.list().await.map_err(|e| {
        tracing::error!(error = %e, "Error listing results");
        e
    })?;

    Ok(Json(ResultsResponse {
        count: results.len(),
        results,
    }))
}

/// Build listing routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/files", get(list_input_files))
        .route("/api/results", get(list_results))
}
