//! Fingerprinting oracle seam
//!
//! The identification workflow never fingerprints audio itself. It hands a
//! credential and a file path to a `FingerprintOracle` and receives raw
//! `(score, recording id, title, artist)` rows, best first.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::RawMatch;
use crate::services::acoustid_client::{AcoustIDClient, AcoustIDError};
use crate::services::fingerprinter::{FingerprintError, Fingerprinter};

/// Oracle failure (transport, decoding, or service-side rejection)
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Fingerprinting failed: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("AcoustID lookup failed: {0}")]
    Lookup(#[from] AcoustIDError),

    #[error("{0}")]
    Other(String),
}

/// External acoustic-fingerprinting oracle
#[async_trait]
pub trait FingerprintOracle: Send + Sync {
    /// Match the audio at `path`
    ///
    /// Returns an empty vector when the audio is valid but unknown.
    async fn lookup(&self, credential: &str, path: &Path) -> Result<Vec<RawMatch>, OracleError>;
}

/// Chromaprint (`fpcalc`) + AcoustID web service oracle
pub struct AcoustIdOracle {
    fingerprinter: Fingerprinter,
    client: AcoustIDClient,
}

impl AcoustIdOracle {
    pub fn new(fingerprinter: Fingerprinter, client: AcoustIDClient) -> Self {
        Self {
            fingerprinter,
            client,
        }
    }

    /// Oracle using the public AcoustID endpoint
    ///
    /// `length_seconds` bounds how much of each file `fpcalc` reads.
    pub fn with_fpcalc(
        fpcalc_path: impl Into<PathBuf>,
        length_seconds: u32,
    ) -> Result<Self, OracleError> {
        let fingerprinter = Fingerprinter::new(fpcalc_path).with_length(length_seconds);
        Ok(Self::new(fingerprinter, AcoustIDClient::new()?))
    }
}

#[async_trait]
impl FingerprintOracle for AcoustIdOracle {
    async fn lookup(&self, credential: &str, path: &Path) -> Result<Vec<RawMatch>, OracleError> {
        let fingerprint = self.fingerprinter.fingerprint_file(path).await?;

        let response = self
            .client
            .lookup(credential, &fingerprint.fingerprint, fingerprint.duration_seconds())
            .await?;

        Ok(AcoustIDClient::flatten_matches(&response))
    }
}
