//! acd-detect library interface
//!
//! Audio copyright detection: validates an audio file, fingerprints it through
//! an external oracle (Chromaprint + AcoustID) and reports candidate
//! recordings with confidence tiers. Exposes the HTTP router for the binary
//! and for integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::services::{IdentificationWorkflow, ResultsStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Identification workflow (credential + scratch folder + oracle)
    pub workflow: Arc<IdentificationWorkflow>,
    /// Persisted result files
    pub results: ResultsStore,
    /// Folder of audio files addressable by name
    pub input_dir: PathBuf,
    /// Folder served under `/static`
    pub static_dir: PathBuf,
    /// HTML page served at `/`
    pub index_file: PathBuf,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        workflow: Arc<IdentificationWorkflow>,
        results: ResultsStore,
        input_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            workflow,
            results,
            input_dir: input_dir.into(),
            static_dir: PathBuf::from("static"),
            index_file: PathBuf::from("index.html"),
            startup_time: Utc::now(),
        }
    }

    pub fn with_static(mut self, static_dir: impl Into<PathBuf>, index_file: impl Into<PathBuf>) -> Self {
        self.static_dir = static_dir.into();
        self.index_file = index_file.into();
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .merge(api::ui_routes())
        .merge(api::detect_routes())
        .merge(api::catalog_routes())
        .merge(api::health_routes())
        .nest_service("/static", static_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
