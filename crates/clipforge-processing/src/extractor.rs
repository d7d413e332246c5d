//! Metadata extraction from probe output
//!
//! The probe emits line-oriented `key=value` text interleaved with section
//! markers. Only an allow-list of keys is consumed; the first occurrence of
//! a key wins, so multi-stream files resolve to their first (video) stream.

use std::path::Path;
use std::sync::Arc;

use clipforge_core::{AppError, AppResult, VideoMetadata};

use crate::scratch::Scratch;
use crate::tool::VideoTool;

#[derive(Clone)]
pub struct MetadataExtractor {
    tool: Arc<dyn VideoTool>,
}

impl MetadataExtractor {
    pub fn new(tool: Arc<dyn VideoTool>) -> Self {
        MetadataExtractor { tool }
    }

    /// Probe a local file and parse its technical metadata.
    pub async fn probe(&self, path: &Path) -> AppResult<VideoMetadata> {
        let raw = self
            .tool
            .probe(path)
            .await
            .map_err(|e| AppError::Extraction(format!("probe process failed: {}", e)))?;

        let metadata = parse_probe_output(&raw)?;
        tracing::debug!(
            path = %path.display(),
            duration = ?metadata.duration,
            codec = ?metadata.codec_name,
            "probed media file"
        );
        Ok(metadata)
    }

    /// Probe in-memory content by staging it as a scratch file first.
    pub async fn probe_bytes(&self, data: &[u8], name_hint: &str) -> AppResult<VideoMetadata> {
        let scratch = Scratch::new()?;
        let path = scratch.write(name_hint, data).await?;
        self.probe(&path).await
        // scratch drops here, removing the staged copy
    }
}

/// Parse probe stdout into a typed metadata record.
///
/// Splits each line once on `=`; keys outside the allow-list and lines
/// without a `=` are ignored. Numeric values that fail to parse are
/// skipped, leaving the slot open for a later occurrence.
pub fn parse_probe_output(raw: &str) -> AppResult<VideoMetadata> {
    let mut metadata = VideoMetadata::default();

    for line in raw.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "width" if metadata.width.is_none() => metadata.width = value.parse().ok(),
            "height" if metadata.height.is_none() => metadata.height = value.parse().ok(),
            "duration" if metadata.duration.is_none() => metadata.duration = value.parse().ok(),
            "bit_rate" if metadata.bit_rate.is_none() => metadata.bit_rate = value.parse().ok(),
            "nb_frames" if metadata.frame_count.is_none() => {
                metadata.frame_count = value.parse().ok()
            }
            "size" if metadata.size.is_none() => metadata.size = value.parse().ok(),
            "codec_name" if metadata.codec_name.is_none() => {
                metadata.codec_name = Some(value.to_string())
            }
            "codec_long_name" if metadata.codec_long_name.is_none() => {
                metadata.codec_long_name = Some(value.to_string())
            }
            "format_name" if metadata.format_name.is_none() => {
                metadata.format_name = Some(value.to_string())
            }
            _ => {}
        }
    }

    if metadata.is_empty() {
        return Err(AppError::Extraction(
            "probe output contained no usable metadata".to_string(),
        ));
    }

    Ok(metadata)
}
