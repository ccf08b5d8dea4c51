//! Bootstrap configuration loading and path resolution
//!
//! Configuration file resolution priority:
//! 1. `ACD_CONFIG` environment variable (explicit path)
//! 2. `<user config dir>/acd/<module>.toml`
//! 3. Compiled defaults (missing files never stop startup)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding an explicit configuration file path
pub const CONFIG_ENV_VAR: &str = "ACD_CONFIG";

/// Bootstrap configuration loaded from TOML file
///
/// Read once at startup. The service must restart to pick up changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// HTTP listen address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Folder holding audio files addressable by name
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Folder receiving `<stem>_copyright.json` result files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Folder served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// HTML page served at `/` when present
    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,

    /// Scratch folder for uploads (OS temp directory when unset)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// AcoustID application key
    #[serde(default)]
    pub acoustid_api_key: Option<String>,

    /// Chromaprint `fpcalc` executable
    #[serde(default = "default_fpcalc_path")]
    pub fpcalc_path: PathBuf,

    /// Seconds of audio fingerprinted from the start of each file
    #[serde(default = "default_fingerprint_length")]
    pub fingerprint_length: u32,

    /// File in `input_dir` identified once at startup
    #[serde(default)]
    pub self_test_file: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            static_dir: default_static_dir(),
            index_file: default_index_file(),
            scratch_dir: None,
            acoustid_api_key: None,
            fpcalc_path: default_fpcalc_path(),
            fingerprint_length: default_fingerprint_length(),
            self_test_file: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Scratch folder, falling back to the OS temp directory
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("app/data/inputs")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("app/data/outputs")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_index_file() -> PathBuf {
    PathBuf::from("index.html")
}

fn default_fpcalc_path() -> PathBuf {
    PathBuf::from("fpcalc")
}

fn default_fingerprint_length() -> u32 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locate the configuration file for a module
///
/// Returns `None` when no candidate location can be determined.
/// The returned path is not guaranteed to exist.
pub fn resolve_config_path(module_name: &str) -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("acd").join(format!("{}.toml", module_name)))
}

/// Parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load configuration, degrading to compiled defaults
///
/// A missing file is normal (defaults apply). An unreadable or malformed
/// file logs a warning and also falls back to defaults.
pub fn load_or_default(path: Option<&Path>) -> TomlConfig {
    let Some(path) = path else {
        info!("No configuration file location available, using defaults");
        return TomlConfig::default();
    };

    if !path.exists() {
        info!("Configuration file {} not found, using defaults", path.display());
        return TomlConfig::default();
    }

    match load_toml_config(path) {
        Ok(config) => {
            info!("Configuration loaded from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{}. Using defaults.", e);
            TomlConfig::default()
        }
    }
}

/// Load configuration, writing a default file on first run
///
/// Behaves like `load_or_default`, except that a missing file is created
/// from the defaults so it can be edited. Failure to write only logs.
pub fn load_or_create(path: Option<&Path>) -> TomlConfig {
    let Some(path) = path else {
        return load_or_default(None);
    };

    if path.exists() {
        return load_or_default(Some(path));
    }

    let config = TomlConfig::default();
    match write_toml_config(&config, path) {
        Ok(()) => info!("Default configuration written to {}", path.display()),
        Err(e) => warn!("Could not write default configuration: {}", e),
    }
    config
}

/// Write configuration atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}
