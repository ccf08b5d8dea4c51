//! Identification result model
//!
//! One `IdentificationResult` is produced per request. It is immutable once
//! built and serializes to the JSON shape persisted under the output folder.

use serde::{Deserialize, Serialize};

use crate::services::confidence::{classify, ConfidenceTier};

/// Message carried by `not_found` results
pub const NOT_FOUND_MESSAGE: &str = "No match found in AcoustID database";

/// Message carried by `error` results when no API key is configured
pub const MISSING_KEY_MESSAGE: &str = "AcoustID API key not configured";

/// Message carried by `error` results whose failure had no text of its own
pub const IDENTIFICATION_FAILED_MESSAGE: &str = "Identification failed";

/// One raw row returned by the fingerprinting oracle
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    /// Match score (0.0 to 1.0)
    pub score: f64,
    /// MusicBrainz recording MBID
    pub recording_id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl RawMatch {
    pub fn new(
        score: f64,
        recording_id: impl Into<String>,
        title: Option<&str>,
        artist: Option<&str>,
    ) -> Self {
        Self {
            score,
            recording_id: recording_id.into(),
            title: title.map(str::to_string),
            artist: artist.map(str::to_string),
        }
    }
}

/// Normalized candidate recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub recording_id: String,
    /// Score rounded to two decimals
    pub match_score: f64,
    /// Tier derived from the unrounded score
    pub confidence: ConfidenceTier,
}

impl MatchCandidate {
    /// Normalize a raw oracle row
    pub fn from_raw(raw: RawMatch) -> Self {
        Self {
            confidence: classify(raw.score),
            match_score: round_score(raw.score),
            title: raw.title,
            artist: raw.artist,
            recording_id: raw.recording_id,
        }
    }

    /// True when both title and artist are present and non-empty
    pub fn is_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        filled(&self.title) && filled(&self.artist)
    }
}

fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Identification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentificationStatus {
    Found,
    NotFound,
    Error,
}

/// Result of one identification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationResult {
    status: IdentificationStatus,
    /// Source filename (final path component)
    file: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    matches: Vec<MatchCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top_match: Option<MatchCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IdentificationResult {
    /// Build a `found` result from oracle rows in oracle order
    ///
    /// Falls back to `not_found` when `raw` is empty, so a `found` result
    /// always carries a top match.
    pub fn found(file: impl Into<String>, raw: Vec<RawMatch>) -> Self {
        let matches: Vec<MatchCandidate> = raw.into_iter().map(MatchCandidate::from_raw).collect();

        let top_match = matches
            .iter()
            .find(|m| m.is_complete())
            .or_else(|| matches.first())
            .cloned();

        match top_match {
            Some(top) => Self {
                status: IdentificationStatus::Found,
                file: file.into(),
                matches,
                top_match: Some(top),
                message: None,
                error: None,
            },
            None => Self::not_found(file),
        }
    }

    pub fn not_found(file: impl Into<String>) -> Self {
        Self {
            status: IdentificationStatus::NotFound,
            file: file.into(),
            matches: Vec::new(),
            top_match: None,
            message: Some(NOT_FOUND_MESSAGE.to_string()),
            error: None,
        }
    }

    /// Build an `error` result; a blank message becomes a fixed one
    pub fn error(file: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            IDENTIFICATION_FAILED_MESSAGE.to_string()
        } else {
            error
        };

        Self {
            status: IdentificationStatus::Error,
            file: file.into(),
            matches: Vec::new(),
            top_match: None,
            message: None,
            error: Some(error),
        }
    }

    pub fn status(&self) -> IdentificationStatus {
        self.status
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn matches(&self) -> &[MatchCandidate] {
        &self.matches
    }

    pub fn top_match(&self) -> Option<&MatchCandidate> {
        self.top_match.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
