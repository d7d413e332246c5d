//! Thumbnail capture: single frames and evenly spaced timelines

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use clipforge_core::{AppError, AppResult, VideoMetadata};

use crate::extractor::MetadataExtractor;
use crate::scratch::Scratch;
use crate::tool::VideoTool;

const PNG_MIMETYPE: &str = "image/png";
const BMP_MIMETYPE: &str = "image/bmp";

/// A captured still image: content, probed metadata and mimetype.
#[derive(Debug)]
pub struct Frame {
    pub content: Bytes,
    pub metadata: VideoMetadata,
    pub mimetype: &'static str,
}

pub struct ThumbnailExtractor {
    tool: Arc<dyn VideoTool>,
    extractor: MetadataExtractor,
}

impl ThumbnailExtractor {
    pub fn new(tool: Arc<dyn VideoTool>) -> Self {
        ThumbnailExtractor {
            extractor: MetadataExtractor::new(tool.clone()),
            tool,
        }
    }

    /// Capture a single PNG frame at `at_seconds`.
    ///
    /// A capture time at or past the end of the video is pulled back to
    /// `duration - 0.1` so the request still lands on a frame.
    pub async fn capture_at(
        &self,
        input: &Path,
        metadata: &VideoMetadata,
        at_seconds: f64,
    ) -> AppResult<Frame> {
        let duration = require_duration(metadata)?;
        let at_seconds = if at_seconds >= duration {
            (duration - 0.1).max(0.0)
        } else {
            at_seconds
        };

        let scratch = Scratch::new()?;
        let output = scratch.path("thumbnail.png");

        self.tool.capture_frame(input, &output, at_seconds).await?;

        let content = tokio::fs::read(&output).await?;
        let frame_metadata = self.extractor.probe(&output).await?;

        tracing::debug!(
            input = %input.display(),
            at_seconds,
            size_bytes = content.len(),
            "captured thumbnail"
        );

        Ok(Frame {
            content: Bytes::from(content),
            metadata: frame_metadata,
            mimetype: PNG_MIMETYPE,
        })
        // scratch drops here, removing the frame file
    }

    /// Capture `count + 1` evenly spaced BMP frames across the video.
    ///
    /// The frames are produced in one batch invocation and handed back as a
    /// lazily consumed [`TimelineFrames`]; each frame file is deleted as it
    /// is yielded, and abandoning the sequence removes the rest.
    pub async fn capture_timeline(
        &self,
        input: &Path,
        metadata: &VideoMetadata,
        count: u32,
    ) -> AppResult<TimelineFrames> {
        if count == 0 {
            return Err(AppError::Validation(
                "timeline capture needs at least one frame".to_string(),
            ));
        }
        let duration = require_duration(metadata)?;
        let step_seconds = (duration - 1.0) / count as f64;
        if step_seconds <= 0.0 {
            return Err(AppError::Validation(format!(
                "video too short ({duration}s) for a {count}-frame timeline"
            )));
        }

        let scratch = Scratch::new()?;
        let pattern = scratch.path("frame_%d.bmp");

        self.tool
            .capture_frames(input, &pattern, step_seconds, count + 1)
            .await?;

        tracing::debug!(
            input = %input.display(),
            frames = count + 1,
            step_seconds,
            "captured timeline frames"
        );

        Ok(TimelineFrames {
            scratch,
            extractor: self.extractor.clone(),
            total: count + 1,
            next_index: 0,
        })
    }
}

/// Single-pass sequence of captured timeline frames.
///
/// Not restartable: each call to [`next_frame`](Self::next_frame) reads,
/// probes and then deletes one frame file. Dropping the value removes any
/// frames that were never consumed.
pub struct TimelineFrames {
    scratch: Scratch,
    extractor: MetadataExtractor,
    total: u32,
    next_index: u32,
}

impl std::fmt::Debug for TimelineFrames {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineFrames")
            .field("total", &self.total)
            .field("next_index", &self.next_index)
            .finish_non_exhaustive()
    }
}

impl TimelineFrames {
    /// Total number of frames captured by the batch invocation.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Yield the next frame, or `None` once the sequence is exhausted.
    pub async fn next_frame(&mut self) -> Option<AppResult<Frame>> {
        if self.next_index >= self.total {
            return None;
        }
        let path = self.scratch.path(&format!("frame_{}.bmp", self.next_index));
        self.next_index += 1;

        let result = async {
            let content = tokio::fs::read(&path).await?;
            let metadata = self.extractor.probe(&path).await?;
            self.scratch.remove(&path).await?;
            Ok(Frame {
                content: Bytes::from(content),
                metadata,
                mimetype: BMP_MIMETYPE,
            })
        }
        .await;

        Some(result)
    }
}

fn require_duration(metadata: &VideoMetadata) -> AppResult<f64> {
    metadata
        .duration
        .ok_or_else(|| AppError::Validation("source metadata has no duration".to_string()))
}
