//! Media asset records and their version lineage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::metadata::VideoMetadata;

/// A captured thumbnail registered on a record.
///
/// The frame content lives as its own file in storage; the record only keeps
/// this descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailInfo {
    pub filename: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size: Option<u64>,
    pub mimetype: String,
}

/// The canonical media asset entity.
///
/// A record either stands alone (`version = 1`, no parent) or was forked
/// from another record, in which case `parent` is a read-only backlink and
/// `version` is the parent's plus one. Deleting a child never touches the
/// parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: Uuid,
    pub filename: String,
    pub metadata: Option<VideoMetadata>,
    pub client_info: Option<String>,
    pub version: i32,
    pub processing: bool,
    pub parent: Option<Box<MediaRecord>>,
    pub thumbnails: HashMap<String, ThumbnailInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Create a fresh version-1 record for newly stored content.
    pub fn new(
        filename: String,
        metadata: Option<VideoMetadata>,
        client_info: Option<String>,
    ) -> Self {
        let now = Utc::now();
        MediaRecord {
            id: Uuid::new_v4(),
            filename,
            metadata,
            client_info,
            version: 1,
            processing: false,
            parent: None,
            thumbnails: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive a forked child record from this one.
    ///
    /// The child gets a new id, `version + 1`, a backlink to this record and
    /// a copy of its thumbnail map. This record is not modified.
    pub fn fork(
        &self,
        filename: String,
        metadata: Option<VideoMetadata>,
        client_info: Option<String>,
    ) -> Self {
        let now = Utc::now();
        MediaRecord {
            id: Uuid::new_v4(),
            filename,
            metadata,
            client_info,
            version: self.version + 1,
            processing: false,
            parent: Some(Box::new(self.clone())),
            thumbnails: self.thumbnails.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Duration in fractional seconds, when metadata has been probed.
    pub fn duration(&self) -> Option<f64> {
        self.metadata.as_ref().and_then(|m| m.duration)
    }
}
