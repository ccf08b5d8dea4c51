//! acd-detect - Audio Copyright Detector service
//!
//! Identifies audio clips against the AcoustID database (Chromaprint
//! fingerprints) and reports candidate recordings with confidence tiers.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use acd_common::config::{load_or_create, resolve_config_path, TomlConfig};
use acd_detect::config::DetectorConfig;
use acd_detect::services::{AcoustIdOracle, IdentificationWorkflow, ResultsStore};
use acd_detect::AppState;

const MODULE_NAME: &str = "acd-detect";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = resolve_config_path(MODULE_NAME);
    let toml_config = load_or_create(config_path.as_deref());

    acd_common::logging::init_tracing(&toml_config.logging)?;

    info!("Starting acd-detect (Audio Copyright Detector)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &config_path {
        info!("Configuration file: {}", path.display());
    }

    let detector_config = DetectorConfig::resolve(&toml_config);
    info!("Scratch folder: {}", detector_config.scratch_root.display());

    let oracle =
        AcoustIdOracle::with_fpcalc(&toml_config.fpcalc_path, toml_config.fingerprint_length)
            .context("Failed to create AcoustID oracle")?;
    let workflow = IdentificationWorkflow::new(detector_config, Arc::new(oracle))
        .context("Failed to initialize scratch folder")?;

    let results = ResultsStore::new(&toml_config.output_dir)
        .context("Failed to initialize output folder")?;
    info!("Results folder: {}", results.output_dir().display());

    std::fs::create_dir_all(&toml_config.static_dir)
        .with_context(|| format!("Failed to create {}", toml_config.static_dir.display()))?;

    let state = AppState::new(Arc::new(workflow), results, &toml_config.input_dir)
        .with_static(&toml_config.static_dir, &toml_config.index_file);

    run_self_test(&state, &toml_config).await;

    let app = acd_detect::build_router(state);

    let listener = tokio::net::TcpListener::bind(&toml_config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", toml_config.bind_address))?;
    info!("Listening on http://{}", toml_config.bind_address);
    info!("Health check: http://{}/health", toml_config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("acd-detect shutting down");
    Ok(())
}

/// Identify the configured self-test file once, persisting its result
///
/// Never fatal: a missing file or failed save only logs.
async fn run_self_test(state: &AppState, toml_config: &TomlConfig) {
    let Some(filename) = &toml_config.self_test_file else {
        return;
    };

    let Some(file_path) = acd_detect::services::input_files::resolve_input(&state.input_dir, filename)
    else {
        warn!("Self-test file not found: {}", state.input_dir.join(filename).display());
        return;
    };

    info!("Self-testing file: {}", file_path.display());
    let result = state.workflow.identify(&file_path).await;

    match state.results.save(filename, &result).await {
        Ok(path) => info!(
            status = ?result.status(),
            "Self-test result saved to: {}",
            path.display()
        ),
        Err(e) => warn!("Self-test failed: {}", e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
