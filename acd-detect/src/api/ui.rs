//! Root page
//!
//! Serves the configured index page when it exists, otherwise a JSON status
//! document so the service stays usable without a web interface.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::SERVICE_NAME;
use crate::AppState;

/// GET /
pub async fn root_page(State(state): State<AppState>) -> Response {
    match tokio::fs::read_to_string(&state.index_file).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::debug!(
                path = %state.index_file.display(),
                error = %e,
                "Index page unavailable, serving status"
            );
            Json(json!({
                "status": "running",
                "service": SERVICE_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "message": "Web interface not found. Place index.html in project root.",
            }))
            .into_response()
        }
    }
}

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(root_page))
}
