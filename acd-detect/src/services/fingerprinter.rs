//! Audio fingerprinting via Chromaprint's `fpcalc`
//!
//! Runs the `fpcalc` tool as a subprocess and parses its JSON output into a
//! compressed fingerprint string suitable for the AcoustID API.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// AcoustID recommends fingerprinting the first 120 seconds
const DEFAULT_LENGTH_SECONDS: u32 = 120;

/// Fingerprinting errors
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("Failed to run fpcalc ({0}): {1}")]
    Spawn(String, std::io::Error),

    #[error("fpcalc failed: {0}")]
    ToolFailed(String),

    #[error("Unreadable fpcalc output: {0}")]
    BadOutput(String),

    #[error("Audio produced an empty fingerprint")]
    EmptyFingerprint,
}

/// Chromaprint fingerprint with the duration of the analyzed file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fingerprint {
    /// Audio duration in seconds
    pub duration: f64,
    /// Compressed, base64-encoded fingerprint
    pub fingerprint: String,
}

impl Fingerprint {
    /// Duration rounded down to whole seconds, as the lookup API expects
    pub fn duration_seconds(&self) -> u64 {
        self.duration.max(0.0) as u64
    }
}

/// Audio fingerprinter
pub struct Fingerprinter {
    /// `fpcalc` executable
    fpcalc_path: PathBuf,
    /// Use first N seconds for fingerprinting
    length_seconds: u32,
}

impl Fingerprinter {
    pub fn new(fpcalc_path: impl Into<PathBuf>) -> Self {
        Self {
            fpcalc_path: fpcalc_path.into(),
            length_seconds: DEFAULT_LENGTH_SECONDS,
        }
    }

    /// Set fingerprint duration
    pub fn with_length(mut self, seconds: u32) -> Self {
        self.length_seconds = seconds;
        self
    }

    /// Fingerprint an audio file
    pub async fn fingerprint_file(&self, audio_path: &Path) -> Result<Fingerprint, FingerprintError> {
        debug!(path = %audio_path.display(), "Running fpcalc");

        let output = Command::new(&self.fpcalc_path)
            .arg("-json")
            .arg("-length")
            .arg(self.length_seconds.to_string())
            .arg(audio_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| FingerprintError::Spawn(self.fpcalc_path.display().to_string(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(FingerprintError::ToolFailed(if detail.is_empty() {
                format!("exit status {}", output.status)
            } else {
                detail.to_string()
            }));
        }

        let fingerprint = parse_fpcalc_output(&output.stdout)?;

        debug!(
            duration = fingerprint.duration,
            fingerprint_length = fingerprint.fingerprint.len(),
            "Fingerprint generated"
        );

        Ok(fingerprint)
    }
}

/// Parse `fpcalc -json` stdout
pub fn parse_fpcalc_output(stdout: &[u8]) -> Result<Fingerprint, FingerprintError> {
    let fingerprint: Fingerprint =
        serde_json::from_slice(stdout).map_err(|e| FingerprintError::BadOutput(e.to_string()))?;

    if fingerprint.fingerprint.is_empty() {
        return Err(FingerprintError::EmptyFingerprint);
    }

    Ok(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprinter_with_length() {
        let fp = Fingerprinter::new("fpcalc").with_length(60);
        assert_eq!(fp.length_seconds, 60);
    }

    #[test]
    fn test_parse_valid_output() {
        let parsed = parse_fpcalc_output(br#"{"duration": 183.47, "fingerprint": "AQADtE"}"#).unwrap();
        assert_eq!(parsed.fingerprint, "AQADtE");
        assert_eq!(parsed.duration_seconds(), 183);
    }

    #[test]
    fn test_parse_empty_fingerprint() {
        let result = parse_fpcalc_output(br#"{"duration": 1.0, "fingerprint": ""}"#);
        assert!(matches!(result, Err(FingerprintError::EmptyFingerprint)));
    }

    #[test]
    fn test_parse_garbage() {
        let result = parse_fpcalc_output(b"ERROR: unable to open file");
        assert!(matches!(result, Err(FingerprintError::BadOutput(_))));
    }

    #[tokio::test]
    async fn test_missing_tool_is_spawn_error() {
        let fp = Fingerprinter::new("/nonexistent/fpcalc-acd-test");
        let result = fp.fingerprint_file(Path::new("clip.wav")).await;
        assert!(matches!(result, Err(FingerprintError::Spawn(_, _))));
    }
}
