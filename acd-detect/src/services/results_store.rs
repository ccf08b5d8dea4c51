//! JSON persistence of identification results
//!
//! Each result is written to `<output_dir>/<stem>_copyright.json`, where
//! `<stem>` is the declared filename without its extension. A later result for
//! the same stem replaces the earlier one.

use acd_common::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::{IdentificationResult, IdentificationStatus};

const RESULT_SUFFIX: &str = "_copyright.json";

/// Summary row for `GET /api/results`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    /// Result file name
    pub filename: String,
    pub status: IdentificationStatus,
    /// Source audio file name recorded in the result
    pub file: String,
    /// Top match title, for `found` results only
    pub title: Option<String>,
}

/// Output folder of persisted results
#[derive(Debug, Clone)]
pub struct ResultsStore {
    output_dir: PathBuf,
}

impl ResultsStore {
    /// Open the output folder, creating it if missing
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Location of the result file for a declared filename
    pub fn result_path(&self, declared_filename: &str) -> PathBuf {
        let stem = Path::new(declared_filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        self.output_dir.join(format!("{}{}", stem, RESULT_SUFFIX))
    }

    /// Persist a result as pretty JSON, returning the written path
    pub async fn save(&self, declared_filename: &str, result: &IdentificationResult) -> Result<PathBuf> {
        let path = self.result_path(declared_filename);
        let json = serde_json::to_string_pretty(result)
            .map_err(|e| Error::Internal(format!("Serialize result failed: {}", e)))?;

        tokio::fs::write(&path, json).await?;
        debug!(path = %path.display(), "Result saved");

        Ok(path)
    }

    /// Summarize every result file in the output folder, sorted by name
    ///
    /// Files that are not valid results are skipped with a warning.
    pub async fn list(&self) -> Result<Vec<ResultSummary>> {
        let mut summaries = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.output_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(summaries),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !filename.ends_with(".json") {
                continue;
            }

            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => {}
                _ => continue,
            }

            let content = match tokio::fs::read_to_string(entry.path()).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(filename = %filename, error = %e, "Skipping unreadable result file");
                    continue;
                }
            };
            let result: IdentificationResult = match serde_json::from_str(&content) {
                Ok(result) => result,
                Err(e) => {
                    warn!(filename = %filename, error = %e, "Skipping unreadable result file");
                    continue;
                }
            };

            let title = match result.status() {
                IdentificationStatus::Found => result.top_match().and_then(|m| m.title.clone()),
                _ => None,
            };

            summaries.push(ResultSummary {
                filename,
                status: result.status(),
                file: result.file().to_string(),
                title,
            });
        }

        summaries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(summaries)
    }
}
