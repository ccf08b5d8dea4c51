//! # ACD Common Library
//!
//! Shared code for the audio copyright detector:
//! - Error and result types
//! - TOML bootstrap configuration and path resolution
//! - Logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
