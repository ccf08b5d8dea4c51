//! Detection services
//!
//! - `format_gate`, `confidence`: pure checks
//! - `scratch`: upload materialization and scoped cleanup
//! - `oracle`, `fingerprinter`, `acoustid_client`: the external matcher
//! - `identifier`: the identification workflow
//! - `results_store`, `input_files`: folder plumbing for the HTTP layer

pub mod acoustid_client;
pub mod confidence;
pub mod fingerprinter;
pub mod format_gate;
pub mod identifier;
pub mod input_files;
pub mod oracle;
pub mod results_store;
pub mod scratch;

pub use confidence::{classify, ConfidenceTier};
pub use format_gate::is_supported_format;
pub use identifier::IdentificationWorkflow;
pub use oracle::{AcoustIdOracle, FingerprintOracle, OracleError};
pub use results_store::ResultsStore;
pub use scratch::ScratchDir;
