//! AcoustID API client
//!
//! Looks up a Chromaprint fingerprint and flattens the response into
//! `(score, recording id, title, artist)` rows, best result first.
//!
//! API reference: https://acoustid.org/webservice

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::RawMatch;

const ACOUSTID_BASE_URL: &str = "https://api.acoustid.org/v2/lookup";
const USER_AGENT: &str = concat!("acd-detect/", env!("CARGO_PKG_VERSION"));
const RATE_LIMIT_MS: u64 = 334; // 3 requests per second (~333ms between requests)

/// Separator between artist names lacking an explicit join phrase
const DEFAULT_ARTIST_SEPARATOR: &str = "; ";

/// AcoustID client errors
#[derive(Debug, Error)]
pub enum AcoustIDError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("AcoustID service error: {0}")]
    ServiceError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid API key")]
    InvalidApiKey,
}

/// AcoustID lookup response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIDResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<AcoustIDResult>,
    #[serde(default)]
    pub error: Option<AcoustIDErrorBody>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIDErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIDResult {
    pub id: String, // AcoustID
    pub score: f64, // Match confidence (0.0 to 1.0)
    pub recordings: Option<Vec<AcoustIDRecording>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIDRecording {
    pub id: String, // MusicBrainz Recording MBID
    pub title: Option<String>,
    pub artists: Option<Vec<AcoustIDArtist>>,
    pub duration: Option<f64>, // Seconds
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIDArtist {
    pub id: String, // MusicBrainz Artist MBID
    pub name: String,
    pub joinphrase: Option<String>,
}

/// Rate limiter for AcoustID (3 req/sec)
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("AcoustID rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// AcoustID API client
///
/// The API key is supplied per lookup so one client can serve any credential.
pub struct AcoustIDClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
}

impl AcoustIDClient {
    pub fn new() -> Result<Self, AcoustIDError> {
        Self::with_base_url(ACOUSTID_BASE_URL)
    }

    fn with_base_url(base_url: impl Into<String>) -> Result<Self, AcoustIDError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AcoustIDError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
            base_url: base_url.into(),
        })
    }

    /// Lookup recordings by Chromaprint fingerprint
    pub async fn lookup(
        &self,
        api_key: &str,
        fingerprint: &str,
        duration_seconds: u64,
    ) -> Result<AcoustIDResponse, AcoustIDError> {
        self.rate_limiter.wait().await;

        let duration = duration_seconds.to_string();
        let params = [
            ("client", api_key),
            ("format", "json"),
            ("meta", "recordings"),
            ("duration", duration.as_str()),
            ("fingerprint", fingerprint),
        ];

        tracing::debug!(duration_seconds, "Querying AcoustID API");

        let response = self
            .http_client
            .post(&self.base_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AcoustIDError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 {
            return Err(AcoustIDError::InvalidApiKey);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AcoustIDError::NetworkError(e.to_string()))?;

        // The service reports most failures as HTTP 400 with a JSON error body
        let parsed: Result<AcoustIDResponse, _> = serde_json::from_str(&body);
        let acoustid_response = match parsed {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(AcoustIDError::ApiError(status.as_u16(), body));
            }
            Err(e) => return Err(AcoustIDError::ParseError(e.to_string())),
        };

        if acoustid_response.status != "ok" {
            let message = acoustid_response
                .error
                .as_ref()
                .and_then(|e| e.message.clone())
                .unwrap_or_else(|| format!("status {}", acoustid_response.status));
            return Err(AcoustIDError::ServiceError(message));
        }

        if let Some(top_result) = acoustid_response.results.first() {
            tracing::info!(
                acoustid = %top_result.id,
                score = top_result.score,
                recordings = top_result.recordings.as_ref().map(|r| r.len()).unwrap_or(0),
                "AcoustID lookup successful"
            );
        } else {
            tracing::info!("AcoustID lookup returned no results");
        }

        Ok(acoustid_response)
    }

    /// Flatten a lookup response into oracle rows
    ///
    /// Results without recordings are skipped. Each recording inherits its
    /// parent result's score, keeping the service's ordering.
    pub fn flatten_matches(response: &AcoustIDResponse) -> Vec<RawMatch> {
        response
            .results
            .iter()
            .filter_map(|result| result.recordings.as_ref().map(|recs| (result.score, recs)))
            .flat_map(|(score, recordings)| {
                recordings.iter().map(move |recording| RawMatch {
                    score,
                    recording_id: recording.id.clone(),
                    title: recording.title.clone(),
                    artist: recording.artists.as_deref().map(join_artists),
                })
            })
            .collect()
    }
}

/// Join artist credits into one display name
fn join_artists(artists: &[AcoustIDArtist]) -> String {
    let mut name = String::new();
    for (i, artist) in artists.iter().enumerate() {
        name.push_str(&artist.name);
        match &artist.joinphrase {
            Some(phrase) => name.push_str(phrase),
            None if i + 1 < artists.len() => name.push_str(DEFAULT_ARTIST_SEPARATOR),
            None => {}
        }
    }
    name
}
