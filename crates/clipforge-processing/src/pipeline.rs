//! Video transformation pipeline
//!
//! Composes cut, crop, rotate and rescale into at most two tool
//! invocations: a stream-copy cut and a single combined filter pass. A
//! request that amounts to no change at all is detected up front and
//! reported as a no-op instead of re-encoding the input.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use clipforge_core::{AppError, AppResult, Cut, EditParams, VideoMetadata};

use crate::extractor::MetadataExtractor;
use crate::scratch::Scratch;
use crate::tool::VideoTool;

/// Result of a non-trivial transform: the produced bytes and the metadata
/// re-probed from them.
#[derive(Debug)]
pub struct TransformOutput {
    pub content: Bytes,
    pub metadata: VideoMetadata,
}

pub struct TransformPipeline {
    tool: Arc<dyn VideoTool>,
    extractor: MetadataExtractor,
}

impl TransformPipeline {
    pub fn new(tool: Arc<dyn VideoTool>) -> Self {
        TransformPipeline {
            extractor: MetadataExtractor::new(tool.clone()),
            tool,
        }
    }

    /// Apply the requested edits to the file at `input`.
    ///
    /// Returns `Ok(None)` when the request is a pure pass-through; the
    /// caller must treat that as success without mutation. The input file
    /// itself is never modified; all intermediates are scratch-scoped and
    /// removed before returning, on success and failure alike.
    pub async fn transform(
        &self,
        input: &Path,
        metadata: &VideoMetadata,
        params: &EditParams,
    ) -> AppResult<Option<TransformOutput>> {
        params.validate()?;

        let duration = metadata
            .duration
            .ok_or_else(|| AppError::Validation("source metadata has no duration".to_string()))?;

        if is_noop(params, duration) {
            tracing::debug!(input = %input.display(), "transform request is a no-op");
            return Ok(None);
        }

        let scratch = Scratch::new()?;
        let ext = container_extension(input);
        let mut current: PathBuf = input.to_path_buf();

        if let Some(cut) = &params.cut {
            let out = scratch.path(&format!("cut{}", ext));
            tracing::debug!(start = cut.start, end = cut.end, "applying stream-copy cut");
            self.tool.transcode(&current, &out, &cut_args(cut)).await?;
            current = out;
        }

        if let Some(filter) = build_filter(params, metadata) {
            let out = scratch.path(&format!("filtered{}", ext));
            tracing::debug!(filter = %filter, "applying combined filter pass");
            self.tool
                .transcode(&current, &out, &filter_args(&filter))
                .await?;
            if current != input {
                // the cut intermediate is superseded
                scratch.remove(&current).await?;
            }
            current = out;
        }

        let content = tokio::fs::read(&current).await?;
        let refreshed = self.extractor.probe(&current).await?;

        Ok(Some(TransformOutput {
            content: Bytes::from(content),
            metadata: refreshed,
        }))
        // scratch drops here; no working file outlives the call
    }
}

/// A request changes nothing when the cut spans the whole duration, no crop
/// is present, rotation is a multiple of a full turn and no rescale was
/// asked for.
fn is_noop(params: &EditParams, duration: f64) -> bool {
    let cut_noop = match &params.cut {
        None => true,
        Some(cut) => cut.start == 0.0 && cut.end as i64 == duration as i64,
    };
    let rotate_noop = match &params.rotate {
        None => true,
        Some(rotate) => rotate.degree.rem_euclid(360) == 0,
    };
    cut_noop && params.crop.is_none() && rotate_noop && params.quality.is_none()
}

/// Stream-copy cut arguments. The tool takes a start offset and a
/// duration, never an absolute end time.
fn cut_args(cut: &Cut) -> Vec<String> {
    vec![
        "-ss".to_string(),
        cut.start.to_string(),
        "-t".to_string(),
        (cut.end - cut.start).to_string(),
        "-c".to_string(),
        "copy".to_string(),
    ]
}

/// Build the combined filter expression: crop, then rotate, then scale,
/// comma-joined. Returns `None` when no clause applies.
fn build_filter(params: &EditParams, metadata: &VideoMetadata) -> Option<String> {
    let mut clauses: Vec<String> = Vec::new();

    if let Some(crop) = &params.crop {
        // never crop larger than the source
        let width = metadata.width.map_or(crop.width, |w| crop.width.min(w));
        let height = metadata.height.map_or(crop.height, |h| crop.height.min(h));
        clauses.push(format!("crop={}:{}:{}:{}", width, height, crop.x, crop.y));
    }

    if let Some(rotate) = &params.rotate {
        let degree = rotate.degree.rem_euclid(360);
        let delta90 = (degree as f64 / 90.0).round() as i64;
        match delta90 {
            1 => clauses.push("transpose=1".to_string()),
            2 => clauses.push("transpose=2,transpose=2".to_string()),
            3 => clauses.push("transpose=2".to_string()),
            _ => {}
        }
    }

    if let Some(quality) = &params.quality {
        clauses.push(format!("scale={}:-2", quality.width));
    }

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(","))
    }
}

/// Filter pass arguments: one `-filter:v` expression, audio copied through.
fn filter_args(filter: &str) -> Vec<String> {
    vec![
        "-filter:v".to_string(),
        filter.to_string(),
        "-max_muxing_queue_size".to_string(),
        "1024".to_string(),
        "-preset".to_string(),
        "ultrafast".to_string(),
        "-c:a".to_string(),
        "copy".to_string(),
    ]
}

/// The input's extension (with dot), kept on working files so the
/// container format survives intermediate stages.
fn container_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}
