//! Input folder lookup and listing

use acd_common::Result;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use crate::services::format_gate::is_supported_format;

/// Audio file available in the input folder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputFile {
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub path: String,
}

/// Resolve a request-supplied name to a file inside `input_dir`
///
/// Only plain single-component names are accepted, so a request can never
/// reach outside the input folder. Returns `None` when the name is not plain
/// or the file does not exist.
pub fn resolve_input(input_dir: &Path, name: &str) -> Option<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return None,
    }

    let path = input_dir.join(name);
    path.is_file().then_some(path)
}

/// List supported audio files in `input_dir`, sorted by name
///
/// A missing folder yields an empty list.
pub async fn list_audio_files(input_dir: &Path) -> Result<Vec<InputFile>> {
    let mut files = Vec::new();

    let mut entries = match tokio::fs::read_dir(input_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_supported_format(&name) {
            continue;
        }

        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }

        files.push(InputFile {
            name,
            size: metadata.len(),
            path: entry.path().display().to_string(),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
