//! Configuration resolution for acd-detect
//!
//! AcoustID API key priority: ENV (`ACOUSTID_API_KEY`) → TOML.
//! A missing key is not fatal: the service starts and every identification
//! reports a configuration error.

use acd_common::config::TomlConfig;
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment variable holding the AcoustID API key
pub const API_KEY_ENV_VAR: &str = "ACOUSTID_API_KEY";

/// Settings handed to the identification workflow at construction
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// AcoustID API key; `None` disables oracle calls
    pub credential: Option<String>,
    /// Only files inside this folder are ever deleted by cleanup
    pub scratch_root: PathBuf,
}

impl DetectorConfig {
    pub fn new(credential: Option<String>, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            credential: credential.filter(|k| is_valid_key(k)),
            scratch_root: scratch_root.into(),
        }
    }

    /// Resolve from environment and bootstrap TOML
    pub fn resolve(toml_config: &TomlConfig) -> Self {
        Self::new(resolve_acoustid_api_key(toml_config), toml_config.scratch_root())
    }
}

/// Resolve AcoustID API key from ENV, then TOML
pub fn resolve_acoustid_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV_VAR).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .acoustid_api_key
        .clone()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("AcoustID API key found in environment and TOML. Using environment (highest priority).");
    }

    if let Some(key) = env_key {
        info!("AcoustID API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("AcoustID API key loaded from TOML config");
        return Some(key);
    }

    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
