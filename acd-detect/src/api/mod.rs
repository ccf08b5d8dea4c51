//! HTTP API handlers for acd-detect

pub mod catalog;
pub mod detect;
pub mod health;
pub mod ui;

pub use catalog::catalog_routes;
pub use detect::detect_routes;
pub use health::health_routes;
pub use ui::ui_routes;

/// Human-readable service name reported by `/` and `/health`
pub const SERVICE_NAME: &str = "Audio Copyright Detector";
