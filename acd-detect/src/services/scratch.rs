//! Scratch files for uploaded audio
//!
//! Uploads are written into a scratch folder so the oracle can read them by
//! path. Cleanup is confined to that folder: a path is only ever deleted when
//! its resolved location lies strictly inside the resolved scratch root, so
//! caller-owned files are never touched.

use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Prefix of every materialized upload
const SCRATCH_PREFIX: &str = "audio_";

/// Scratch folder owning materialized uploads
#[derive(Debug, Clone)]
pub struct ScratchDir {
    /// Canonical root path
    root: PathBuf,
}

impl ScratchDir {
    /// Open (creating if missing) a scratch folder
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write upload bytes to a fresh scratch file
    ///
    /// The file is named `audio_<random hex><.ext>`, keeping the declared
    /// filename's extension so format sniffing downstream still works.
    ///
    /// The returned guard owns the file from the moment it is created. If the
    /// write fails, or this future is dropped part way, the guard removes it.
    pub async fn materialize(&self, bytes: &[u8], declared_filename: &str) -> io::Result<ScratchGuard> {
        let extension = Path::new(declared_filename)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let path = self.root.join(format!(
            "{}{}{}",
            SCRATCH_PREFIX,
            Uuid::new_v4().simple(),
            extension
        ));

        // Synchronous create so no await point separates creation from the guard
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        let guard = self.guard(&path);
        let mut file = tokio::fs::File::from_std(file);

        write_all_and_sync(&mut file, bytes).await?;

        info!(path = %path.display(), bytes = bytes.len(), "Upload saved to scratch file");
        Ok(guard)
    }

    /// Guard that releases `path` when dropped, if it is a scratch file
    pub fn guard(&self, path: impl Into<PathBuf>) -> ScratchGuard {
        ScratchGuard {
            path: path.into(),
            root: self.root.clone(),
        }
    }

    /// True when `target` resolves to a location strictly inside the root
    pub fn contains(&self, target: &Path) -> bool {
        is_within(&self.root, target)
    }
}

async fn write_all_and_sync(file: &mut tokio::fs::File, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

/// Containment check on resolved paths
///
/// Component-wise ancestry, not string prefix: `/tmp/scratch2/x` is not
/// inside `/tmp/scratch`. A target that cannot be resolved (e.g. missing) is
/// never considered inside.
pub fn is_within(root: &Path, target: &Path) -> bool {
    let Ok(root) = root.canonicalize() else {
        return false;
    };
    let Ok(target) = target.canonicalize() else {
        return false;
    };
    target != root && target.starts_with(&root)
}

/// Scoped release of a scratch file
///
/// Dropping the guard deletes the file when it lies inside the scratch root.
/// Paths outside the root are left alone. Failures are logged only.
#[derive(Debug)]
#[must_use = "dropping the guard deletes the scratch file"]
pub struct ScratchGuard {
    path: PathBuf,
    root: PathBuf,
}

impl ScratchGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn release(&self) {
        if !is_within(&self.root, &self.path) {
            debug!(path = %self.path.display(), "Not a scratch file, leaving in place");
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "Cleaned up scratch file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => error!(
                path = %self.path.display(),
                error = %e,
                "Failed to clean up scratch file"
            ),
        }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        self.release();
    }
}
