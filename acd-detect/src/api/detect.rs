//! Detection endpoints
//!
//! POST /detect/:filename, POST /detect-upload
//!
//! Both apply the format gate before any work, run the identification
//! workflow, persist the result JSON and return it with `saved_to`.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::IdentificationResult;
use crate::services::format_gate::{is_supported_format, supported_formats_list};
use crate::services::input_files::resolve_input;
use crate::AppState;

/// Upload size cap for `/detect-upload`
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Identification result plus the location it was persisted to
#[derive(Debug, Serialize)]
pub struct DetectResponse {
    #[serde(flatten)]
    pub result: IdentificationResult,
    pub saved_to: String,
}

/// Uploaded audio from the multipart `file` field
struct UploadedFile {
    filename: String,
    data: Vec<u8>,
}

/// POST /detect/:filename
///
/// Identify a file already present in the input folder. The input file is
/// never deleted.
pub async fn detect_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Json<DetectResponse>> {
    let file_path = resolve_input(&state.input_dir, &filename)
        .ok_or_else(|| ApiError::NotFound(format!("File not found: {}", filename)))?;

    if !is_supported_format(&filename) {
        return Err(ApiError::BadRequest("Invalid audio format".to_string()));
    }

    info!(path = %file_path.display(), "Processing file");

    let result = state.workflow.identify(&file_path).await;
    persist(&state, &filename, result).await
}

/// POST /detect-upload
///
/// Identify an uploaded file (multipart field `file`).
pub async fn detect_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<DetectResponse>> {
    let upload = read_upload(&mut multipart).await?;

    info!(filename = %upload.filename, bytes = upload.data.len(), "Processing upload");

    let result = state
        .workflow
        .identify_upload(&upload.data, &upload.filename)
        .await
        .map_err(|e| ApiError::Internal(format!("Detection failed: {}", e)))?;

    persist(&state, &upload.filename, result).await
}

async fn persist(
    state: &AppState,
    filename: &str,
    result: IdentificationResult,
) -> ApiResult<Json<DetectResponse>> {
    let saved_to = state.results.save(filename, &result).await?;
    info!(path = %saved_to.display(), status = ?result.status(), "Saved result");

    Ok(Json(DetectResponse {
        result,
        saved_to: saved_to.display().to_string(),
    }))
}

async fn read_upload(multipart: &mut Multipart) -> ApiResult<UploadedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to parse multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no filename".to_string()))?;

        // Gate before buffering the body
        if !is_supported_format(&filename) {
            return Err(ApiError::BadRequest(format!(
                "Invalid audio format. Supported: {}",
                supported_formats_list()
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
            .to_vec();

        return Ok(UploadedFile { filename, data });
    }

    Err(ApiError::BadRequest(
        "No file provided. Use 'file' field in multipart form.".to_string(),
    ))
}

/// Build detection routes
pub fn detect_routes() -> Router<AppState> {
    Router::new()
        .route("/detect/:filename", post(detect_file))
        .route(
            "/detect-upload",
            post(detect_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}
