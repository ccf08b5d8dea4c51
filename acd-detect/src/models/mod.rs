//! Data models

pub mod identification;

pub use identification::{
    IdentificationResult, IdentificationStatus, MatchCandidate, RawMatch,
    IDENTIFICATION_FAILED_MESSAGE, MISSING_KEY_MESSAGE, NOT_FOUND_MESSAGE,
};
