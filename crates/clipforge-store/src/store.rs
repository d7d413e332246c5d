//! Versioned media store
//!
//! Combines the file store and the record collection into the asset
//! lifecycle: create, edit-in-place, fork-as-new-version, delete. Record
//! state and on-disk state are kept consistent: a record with
//! `processing = false` always has a readable backing file, and no two live
//! records resolve to the same key.

use std::sync::Arc;

use bytes::Bytes;
use clipforge_core::{AppError, AppResult, MediaRecord, ThumbnailInfo, VideoMetadata};
use uuid::Uuid;

use crate::files::FileStore;
use crate::records::RecordStore;

pub struct MediaStore {
    records: Arc<dyn RecordStore>,
    files: FileStore,
}

impl MediaStore {
    pub fn new(records: Arc<dyn RecordStore>, files: FileStore) -> Self {
        MediaStore { records, files }
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    /// Fetch the record for an asset.
    pub async fn get_record(&self, id: Uuid) -> AppResult<MediaRecord> {
        self.records
            .find_one(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No media record with id {}", id)))
    }

    /// Fetch the stored content for an asset.
    pub async fn get(&self, id: Uuid) -> AppResult<Bytes> {
        let record = self.get_record(id).await?;
        let data = self.files.read(&record.filename).await?;
        Ok(Bytes::from(data))
    }

    /// Store new content and create its version-1 record.
    pub async fn put(
        &self,
        data: Bytes,
        filename: &str,
        metadata: Option<VideoMetadata>,
        client_info: Option<String>,
        folder: Option<&str>,
    ) -> AppResult<MediaRecord> {
        let key = match folder {
            Some(folder) => format!("{}/{}", folder.trim_end_matches('/'), filename),
            None => filename.to_string(),
        };

        if self.files.exists(&key).await? {
            return Err(AppError::Validation(format!(
                "Storage key {} is already in use",
                key
            )));
        }

        self.files.write(&key, &data).await?;

        let record = MediaRecord::new(key.clone(), metadata, client_info);
        match self.records.insert_one(record).await {
            Ok(record) => {
                tracing::info!(id = %record.id, key = %key, size_bytes = data.len(), "stored new media");
                Ok(record)
            }
            Err(e) => {
                // do not leave an orphan artifact behind a failed insert
                let _ = self.files.delete(&key).await;
                Err(e)
            }
        }
    }

    /// Replace an asset's content in place, preserving filename and version.
    ///
    /// The record is flagged `processing` for the duration of the file
    /// replacement and always unflagged afterwards, including on failure.
    pub async fn edit(
        &self,
        id: Uuid,
        data: Bytes,
        client_info: Option<String>,
        metadata: Option<VideoMetadata>,
    ) -> AppResult<MediaRecord> {
        let record = self
            .records
            .find_one_and_update(id, &|r| r.processing = true)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No media record with id {}", id)))?;

        tracing::info!(id = %id, key = %record.filename, "editing media in place");

        let replaced = self.files.replace(&record.filename, &data).await;

        match replaced {
            Ok(()) => {
                let updated = self
                    .records
                    .find_one_and_update(id, &|r| {
                        r.metadata = metadata.clone();
                        r.client_info = client_info.clone();
                        r.processing = false;
                    })
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(format!("Record {} vanished during edit", id))
                    })?;
                Ok(updated)
            }
            Err(e) => {
                let _ = self
                    .records
                    .find_one_and_update(id, &|r| r.processing = false)
                    .await;
                Err(e)
            }
        }
    }

    /// Fork an asset: store new content under a new filename and create a
    /// child record pointing back at the parent. The parent is untouched.
    pub async fn add(
        &self,
        id: Uuid,
        data: Bytes,
        new_filename: &str,
        client_info: Option<String>,
        metadata: Option<VideoMetadata>,
    ) -> AppResult<MediaRecord> {
        let parent = self.get_record(id).await?;

        if self.files.exists(new_filename).await? {
            return Err(AppError::Validation(format!(
                "Storage key {} is already in use",
                new_filename
            )));
        }

        self.files.write(new_filename, &data).await?;

        let child = parent.fork(new_filename.to_string(), metadata, client_info);
        match self.records.insert_one(child).await {
            Ok(child) => {
                tracing::info!(
                    id = %child.id,
                    parent_id = %parent.id,
                    version = child.version,
                    key = %new_filename,
                    "forked media version"
                );
                Ok(child)
            }
            Err(e) => {
                let _ = self.files.delete(new_filename).await;
                Err(e)
            }
        }
    }

    /// Remove an asset's content, thumbnails and record.
    ///
    /// Deleting an id with no record (or a record with no backing file) is
    /// a silent no-op; children and parents are never cascaded into.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let record = match self.records.find_one(id).await? {
            Some(record) => record,
            None => {
                tracing::debug!(id = %id, "delete of absent record ignored");
                return Ok(());
            }
        };

        self.files.delete(&record.filename).await?;
        for thumbnail in record.thumbnails.values() {
            self.files.delete(&thumbnail.filename).await?;
        }
        self.records.remove(id).await?;

        tracing::info!(id = %id, key = %record.filename, "deleted media");
        Ok(())
    }

    /// Store a captured frame and register it on the record's thumbnail map.
    pub async fn put_thumbnail(
        &self,
        id: Uuid,
        key: &str,
        data: Bytes,
        info: ThumbnailInfo,
    ) -> AppResult<MediaRecord> {
        // fail before writing anything if the asset is gone
        self.get_record(id).await?;

        self.files.write(&info.filename, &data).await?;

        let updated = self
            .records
            .find_one_and_update(id, &|r| {
                r.thumbnails.insert(key.to_string(), info.clone());
            })
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Record {} vanished during thumbnail update", id))
            })?;

        tracing::info!(id = %id, thumbnail_key = %key, file = %info.filename, "registered thumbnail");
        Ok(updated)
    }
}
