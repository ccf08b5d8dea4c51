//! Supported audio format check
//!
//! Applied by callers before any upload is written or the oracle is invoked.

use std::path::Path;

/// Extensions accepted for identification (lowercase, no dot)
pub const SUPPORTED_FORMATS: [&str; 8] = ["mp3", "flac", "ogg", "m4a", "wav", "wma", "aiff", "aac"];

/// Check whether a filename carries a supported audio extension
///
/// Case-insensitive. Missing or unknown extensions return false.
pub fn is_supported_format(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_FORMATS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Comma-separated list for user-facing messages
pub fn supported_formats_list() -> String {
    SUPPORTED_FORMATS.join(", ")
}
