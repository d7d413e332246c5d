//! Local filesystem storage for media artifacts

use std::path::{Path, PathBuf};

use clipforge_core::{AppError, AppResult};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Flat file store rooted at a single directory.
///
/// Keys are storage-relative paths, optionally containing folder segments.
/// No two live records may resolve to the same key; the [`MediaStore`]
/// enforces that above this layer.
///
/// [`MediaStore`]: crate::store::MediaStore
#[derive(Clone, Debug)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create the store, making the root directory if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> AppResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            AppError::StorageIo(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(FileStore { base_path })
    }

    /// Convert a storage key to a filesystem path, rejecting traversal
    /// sequences that could escape the root.
    fn key_to_path(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty()
            || key.starts_with('/')
            || key.split('/').any(|segment| segment == "..")
        {
            return Err(AppError::Validation(format!("Invalid storage key: {}", key)));
        }
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write content under the given key, creating parent folders.
    pub async fn write(&self, key: &str, data: &[u8]) -> AppResult<()> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            AppError::StorageIo(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        file.write_all(data).await.map_err(|e| {
            AppError::StorageIo(format!("Failed to write file {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            AppError::StorageIo(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::debug!(key = %key, size_bytes = data.len(), "stored file");
        Ok(())
    }

    /// Atomically replace the content under an existing key.
    ///
    /// The new content is written to a sibling temp file and renamed over
    /// the target, so readers observe either the old or the new bytes.
    pub async fn replace(&self, key: &str, data: &[u8]) -> AppResult<()> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let tmp_path = path.with_file_name(format!(
            ".{}.tmp-{}",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Uuid::new_v4().simple()
        ));

        let result = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, &path).await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(AppError::StorageIo(format!(
                "Failed to replace file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::debug!(key = %key, size_bytes = data.len(), "replaced file");
        Ok(())
    }

    /// Read the content under a key.
    pub async fn read(&self, key: &str) -> AppResult<Vec<u8>> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AppError::NotFound(format!("No stored file for key {}", key)));
        }

        fs::read(&path).await.map_err(|e| {
            AppError::StorageIo(format!("Failed to read file {}: {}", path.display(), e))
        })
    }

    /// Delete the content under a key. Deleting an absent key is not an
    /// error.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            AppError::StorageIo(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::debug!(key = %key, "deleted file");
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }
}
