//! Edit orchestration
//!
//! Ties the store and the pipelines together: fetch the asset, stage a
//! working copy, run the external tool stages, persist the result as an
//! in-place edit or a forked version. Every mutating flow runs under the
//! asset's lock so concurrent edits of one id cannot interleave.

use std::sync::Arc;

use bytes::Bytes;
use clipforge_core::{AppResult, EditParams, MediaRecord, ThumbnailInfo, VideoMetadata};
use clipforge_store::{AssetLocks, MediaStore};
use uuid::Uuid;

use crate::extractor::MetadataExtractor;
use crate::pipeline::TransformPipeline;
use crate::scratch::Scratch;
use crate::thumbnail::{Frame, ThumbnailExtractor};
use crate::tool::VideoTool;

pub struct EditService {
    store: Arc<MediaStore>,
    pipeline: TransformPipeline,
    thumbnails: ThumbnailExtractor,
    extractor: MetadataExtractor,
    locks: AssetLocks,
}

impl EditService {
    pub fn new(store: Arc<MediaStore>, tool: Arc<dyn VideoTool>) -> Self {
        EditService {
            store,
            pipeline: TransformPipeline::new(tool.clone()),
            thumbnails: ThumbnailExtractor::new(tool.clone()),
            extractor: MetadataExtractor::new(tool),
            locks: AssetLocks::new(),
        }
    }

    pub fn store(&self) -> &MediaStore {
        &self.store
    }

    /// Probe and store new content as a version-1 asset.
    pub async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        client_info: Option<String>,
        folder: Option<&str>,
    ) -> AppResult<MediaRecord> {
        let metadata = self.extractor.probe_bytes(&data, file_name_of(filename)).await?;
        self.store
            .put(data, filename, Some(metadata), client_info, folder)
            .await
    }

    /// Transform an asset and overwrite it in place.
    ///
    /// A request that reduces to a no-op returns the record untouched;
    /// filename and version are preserved either way.
    pub async fn edit_media(
        &self,
        id: Uuid,
        params: &EditParams,
        client_info: Option<String>,
    ) -> AppResult<MediaRecord> {
        params.validate()?;
        let _guard = self.locks.acquire(id).await;

        let (record, content, metadata) = self.load_source(id).await?;

        let scratch = Scratch::new()?;
        let input = scratch.write(file_name_of(&record.filename), &content).await?;

        match self.pipeline.transform(&input, &metadata, params).await? {
            None => {
                tracing::info!(id = %id, "edit request changed nothing");
                Ok(record)
            }
            Some(output) => {
                self.store
                    .edit(id, output.content, client_info, Some(output.metadata))
                    .await
            }
        }
    }

    /// Transform an asset into a new forked version under a new filename.
    ///
    /// The parent stays untouched; a no-op request forks the unmodified
    /// content.
    pub async fn fork_media(
        &self,
        id: Uuid,
        new_filename: &str,
        params: &EditParams,
        client_info: Option<String>,
    ) -> AppResult<MediaRecord> {
        params.validate()?;
        let _guard = self.locks.acquire(id).await;

        let (record, content, metadata) = self.load_source(id).await?;

        let scratch = Scratch::new()?;
        let input = scratch.write(file_name_of(&record.filename), &content).await?;

        let (data, metadata) = match self.pipeline.transform(&input, &metadata, params).await? {
            None => (content, metadata),
            Some(output) => (output.content, output.metadata),
        };

        self.store
            .add(id, data, new_filename, client_info, Some(metadata))
            .await
    }

    /// Capture a single frame and register it on the record, keyed by the
    /// requested capture time.
    pub async fn capture_thumbnail(&self, id: Uuid, at_seconds: f64) -> AppResult<MediaRecord> {
        let _guard = self.locks.acquire(id).await;

        let (record, content, metadata) = self.load_source(id).await?;

        let scratch = Scratch::new()?;
        let input = scratch.write(file_name_of(&record.filename), &content).await?;

        let frame = self.thumbnails.capture_at(&input, &metadata, at_seconds).await?;

        let key = at_seconds.to_string();
        let filename = format!("{}_thumb_{}.png", base_name(&record.filename), key);
        let info = thumbnail_info(filename, &frame);

        self.store.put_thumbnail(id, &key, frame.content, info).await
    }

    /// Capture an evenly spaced timeline of `count + 1` frames and register
    /// each on the record, keyed by frame index.
    pub async fn capture_timeline(&self, id: Uuid, count: u32) -> AppResult<MediaRecord> {
        let _guard = self.locks.acquire(id).await;

        let (record, content, metadata) = self.load_source(id).await?;

        let scratch = Scratch::new()?;
        let input = scratch.write(file_name_of(&record.filename), &content).await?;

        let mut frames = self
            .thumbnails
            .capture_timeline(&input, &metadata, count)
            .await?;

        let mut updated = record;
        let mut index = 0u32;
        while let Some(frame) = frames.next_frame().await {
            let frame = frame?;
            let key = index.to_string();
            let filename = format!("{}_frame_{}.bmp", base_name(&updated.filename), index);
            let info = thumbnail_info(filename, &frame);
            updated = self.store.put_thumbnail(id, &key, frame.content, info).await?;
            index += 1;
        }

        tracing::info!(id = %id, frames = index, "timeline thumbnails registered");
        Ok(updated)
    }

    /// Delete an asset under its lock. Absent assets are a silent no-op.
    pub async fn delete_media(&self, id: Uuid) -> AppResult<()> {
        {
            let _guard = self.locks.acquire(id).await;
            self.store.delete(id).await?;
        }
        self.locks.prune();
        Ok(())
    }

    /// Fetch record, content and metadata, probing the content when the
    /// record carries no metadata yet.
    async fn load_source(&self, id: Uuid) -> AppResult<(MediaRecord, Bytes, VideoMetadata)> {
        let record = self.store.get_record(id).await?;
        let content = self.store.get(id).await?;
        let metadata = match record.metadata.clone() {
            Some(metadata) => metadata,
            None => {
                self.extractor
                    .probe_bytes(&content, file_name_of(&record.filename))
                    .await?
            }
        };
        Ok((record, content, metadata))
    }
}

fn thumbnail_info(filename: String, frame: &Frame) -> ThumbnailInfo {
    ThumbnailInfo {
        filename,
        width: frame.metadata.width,
        height: frame.metadata.height,
        size: frame.metadata.size.or(Some(frame.content.len() as u64)),
        mimetype: frame.mimetype.to_string(),
    }
}

/// Last path component of a storage key, used as a scratch name hint.
fn file_name_of(filename: &str) -> &str {
    filename.rsplit('/').next().unwrap_or(filename)
}

/// Storage key without its extension, used to derive thumbnail keys.
fn base_name(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => filename,
    }
}
