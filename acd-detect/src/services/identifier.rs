//! Identification workflow
//!
//! Runs one audio file through the fingerprinting oracle and normalizes the
//! outcome into an `IdentificationResult`. Every exit path returns a result;
//! oracle failures become `error` results, never errors to the caller.
//!
//! Scratch cleanup is scoped: a `ScratchGuard` is taken before any other work
//! and released on every return (and on unwind or cancellation). A panic
//! inside the oracle is caught and reported as an `error` result.

use futures::FutureExt;
use std::any::Any;
use std::io;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::DetectorConfig;
use crate::models::{IdentificationResult, MISSING_KEY_MESSAGE};
use crate::services::oracle::FingerprintOracle;
use crate::services::scratch::{ScratchDir, ScratchGuard};

/// Identification workflow bound to one credential and scratch folder
pub struct IdentificationWorkflow {
    credential: Option<String>,
    scratch: ScratchDir,
    oracle: Arc<dyn FingerprintOracle>,
}

impl IdentificationWorkflow {
    /// Create the workflow, creating the scratch folder if missing
    pub fn new(config: DetectorConfig, oracle: Arc<dyn FingerprintOracle>) -> io::Result<Self> {
        if config.credential.is_none() {
            warn!("AcoustID API key not configured; identifications will report an error");
        }

        Ok(Self {
            credential: config.credential,
            scratch: ScratchDir::new(&config.scratch_root)?,
            oracle,
        })
    }

    /// Whether an oracle credential is present
    pub fn configured(&self) -> bool {
        self.credential.is_some()
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Identify the audio file at `path`
    ///
    /// If `path` is a scratch file it is deleted before returning. Any other
    /// path is left untouched.
    pub async fn identify(&self, path: &Path) -> IdentificationResult {
        self.identify_as(self.scratch.guard(path), &file_name(path)).await
    }

    /// Materialize an upload into the scratch folder and identify it
    ///
    /// The result reports the declared filename rather than the scratch name.
    /// Fails only when the upload cannot be written; the oracle is not called
    /// in that case.
    pub async fn identify_upload(
        &self,
        bytes: &[u8],
        declared_filename: &str,
    ) -> io::Result<IdentificationResult> {
        let file = file_name(Path::new(declared_filename));

        let scratch = self
            .scratch
            .materialize(bytes, declared_filename)
            .await
            .map_err(|e| {
                error!(file = %file, error = %e, "Failed to save upload");
                e
            })?;

        Ok(self.identify_as(scratch, &file).await)
    }

    async fn identify_as(&self, scratch: ScratchGuard, file: &str) -> IdentificationResult {
        let path = scratch.path();

        let Some(credential) = self.credential.as_deref() else {
            return IdentificationResult::error(file, MISSING_KEY_MESSAGE);
        };

        info!(path = %path.display(), "Identifying audio");

        let lookup = AssertUnwindSafe(self.oracle.lookup(credential, path)).catch_unwind();
        let outcome = match lookup.await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic_reason(panic.as_ref());
                error!(file = %file, reason = %reason, "Oracle panicked");
                return IdentificationResult::error(file, format!("Oracle panicked: {}", reason));
            }
        };

        match outcome {
            Ok(rows) if rows.is_empty() => {
                info!(file = %file, "No match found");
                IdentificationResult::not_found(file)
            }
            Ok(rows) => {
                let result = IdentificationResult::found(file, rows);
                if let Some(top) = result.top_match() {
                    info!(
                        file = %file,
                        matches = result.matches().len(),
                        recording_id = %top.recording_id,
                        score = top.match_score,
                        "Match found"
                    );
                }
                result
            }
            Err(e) => {
                error!(file = %file, error = %e, "Identification error");
                IdentificationResult::error(file, e.to_string())
            }
        }
    }
}

fn panic_reason(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Final path component, falling back to the whole path
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
