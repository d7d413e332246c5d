//! Scoped working files for pipeline stages
//!
//! Every transform or capture operation stages its intermediates inside a
//! [`Scratch`]. The backing directory is randomized, so concurrent
//! operations never collide regardless of the hinted names, and it is
//! removed wholesale when the value drops: normal return, early return and
//! error paths all release the same way.

use std::path::{Path, PathBuf};

use clipforge_core::{AppError, AppResult};
use tempfile::TempDir;
use tokio::fs;

pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> AppResult<Self> {
        let dir = TempDir::with_prefix("clipforge-").map_err(|e| {
            AppError::StorageIo(format!("Failed to create scratch directory: {}", e))
        })?;
        Ok(Scratch { dir })
    }

    /// Derive a path inside the scratch directory from a name hint.
    ///
    /// The hint must be a bare file name; it exists to keep a recognizable
    /// extension on working files, not to provide uniqueness.
    pub fn path(&self, name_hint: &str) -> PathBuf {
        self.dir.path().join(name_hint)
    }

    /// Materialize a payload under the given name hint.
    pub async fn write(&self, name_hint: &str, data: &[u8]) -> AppResult<PathBuf> {
        if name_hint.is_empty() || name_hint.contains('/') || name_hint.contains("..") {
            return Err(AppError::Validation(format!(
                "Invalid scratch name hint: {}",
                name_hint
            )));
        }
        let path = self.path(name_hint);
        fs::write(&path, data).await?;
        Ok(path)
    }

    /// Remove a single working file early, once superseded by a later
    /// stage. Remaining files go when the scratch drops.
    pub async fn remove(&self, path: &Path) -> AppResult<()> {
        fs::remove_file(path).await?;
        Ok(())
    }
}
