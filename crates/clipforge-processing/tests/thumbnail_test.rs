//! Thumbnail capture tests against the canned tool

use std::path::PathBuf;
use std::sync::Arc;

use clipforge_core::VideoMetadata;
use clipforge_processing::testing::{FakeTool, ToolCall};
use clipforge_processing::ThumbnailExtractor;
use tempfile::tempdir;

fn metadata(duration: f64) -> VideoMetadata {
    VideoMetadata {
        width: Some(1280),
        height: Some(720),
        duration: Some(duration),
        ..VideoMetadata::default()
    }
}

async fn stage_input(dir: &std::path::Path) -> PathBuf {
    let input = dir.join("source.mp4");
    tokio::fs::write(&input, b"source bytes").await.unwrap();
    input
}

fn frame_paths(tool: &FakeTool) -> (PathBuf, Vec<PathBuf>) {
    let call = tool
        .calls()
        .into_iter()
        .find_map(|c| match c {
            ToolCall::CaptureFrames { pattern, frames, .. } => Some((pattern, frames)),
            _ => None,
        })
        .expect("no batch capture recorded");
    let template = call.0.to_string_lossy().into_owned();
    let paths = (0..call.1)
        .map(|i| PathBuf::from(template.replace("%d", &i.to_string())))
        .collect();
    (call.0, paths)
}

#[tokio::test]
async fn test_capture_at_within_duration() {
    let dir = tempdir().unwrap();
    let input = stage_input(dir.path()).await;
    let tool = Arc::new(FakeTool::new());
    let extractor = ThumbnailExtractor::new(tool.clone());

    let frame = extractor.capture_at(&input, &metadata(30.0), 12.5).await.unwrap();

    assert_eq!(&frame.content[..], b"transcoded bytes");
    assert_eq!(frame.mimetype, "image/png");
    // frame metadata comes from probing the captured image
    assert_eq!(frame.metadata.codec_name.as_deref(), Some("png"));

    let calls = tool.calls();
    let ToolCall::CaptureFrame { at_seconds, output, .. } = &calls[0] else {
        panic!("expected a frame capture first, got {:?}", calls);
    };
    assert_eq!(*at_seconds, 12.5);
    // the captured frame file has been cleaned up
    assert!(!output.exists());
}

#[tokio::test]
async fn test_capture_at_clamps_to_just_before_the_end() {
    let dir = tempdir().unwrap();
    let input = stage_input(dir.path()).await;
    let tool = Arc::new(FakeTool::new());
    let extractor = ThumbnailExtractor::new(tool.clone());

    extractor.capture_at(&input, &metadata(30.0), 95.0).await.unwrap();

    let ToolCall::CaptureFrame { at_seconds, .. } = &tool.calls()[0] else {
        panic!("expected a frame capture");
    };
    assert_eq!(*at_seconds, 29.9);
}

#[tokio::test]
async fn test_timeline_yields_count_plus_one_still_images() {
    let dir = tempdir().unwrap();
    let input = stage_input(dir.path()).await;
    let tool = Arc::new(FakeTool::new());
    let extractor = ThumbnailExtractor::new(tool.clone());

    let mut frames = extractor
        .capture_timeline(&input, &metadata(30.0), 4)
        .await
        .unwrap();
    assert_eq!(frames.total(), 5);

    let (_, paths) = frame_paths(&tool);
    assert_eq!(paths.len(), 5);
    for path in &paths {
        assert!(path.exists(), "frame {} should exist before consumption", path.display());
    }

    let mut yielded = 0;
    while let Some(frame) = frames.next_frame().await {
        let frame = frame.unwrap();
        assert_eq!(frame.mimetype, "image/bmp");
        assert_eq!(&frame.content[..], b"transcoded bytes");
        // each frame file is removed as it is yielded
        assert!(!paths[yielded].exists());
        yielded += 1;
    }
    assert_eq!(yielded, 5);

    // even spacing over (duration - 1)
    let ToolCall::CaptureFrames { step_seconds, frames: batch, .. } = &tool.calls()[0] else {
        panic!("expected a batch capture");
    };
    assert_eq!(*step_seconds, (30.0 - 1.0) / 4.0);
    assert_eq!(*batch, 5);
}

#[tokio::test]
async fn test_abandoning_the_timeline_cleans_remaining_frames() {
    let dir = tempdir().unwrap();
    let input = stage_input(dir.path()).await;
    let tool = Arc::new(FakeTool::new());
    let extractor = ThumbnailExtractor::new(tool.clone());

    let mut frames = extractor
        .capture_timeline(&input, &metadata(30.0), 4)
        .await
        .unwrap();

    // consume only two of five
    frames.next_frame().await.unwrap().unwrap();
    frames.next_frame().await.unwrap().unwrap();

    let (pattern, paths) = frame_paths(&tool);
    assert!(!paths[0].exists());
    assert!(!paths[1].exists());
    assert!(paths[2].exists());

    drop(frames);

    for path in &paths {
        assert!(!path.exists(), "frame {} must be gone after abandonment", path.display());
    }
    assert!(!pattern.parent().unwrap().exists());
}

#[tokio::test]
async fn test_capture_failure_propagates() {
    let dir = tempdir().unwrap();
    let input = stage_input(dir.path()).await;
    let tool = Arc::new(FakeTool::new());
    tool.fail_captures();
    let extractor = ThumbnailExtractor::new(tool.clone());

    let err = extractor
        .capture_at(&input, &metadata(30.0), 5.0)
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "ToolInvocation");

    let err = extractor
        .capture_timeline(&input, &metadata(30.0), 4)
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "ToolInvocation");
}

#[tokio::test]
async fn test_timeline_rejects_degenerate_requests() {
    let dir = tempdir().unwrap();
    let input = stage_input(dir.path()).await;
    let tool = Arc::new(FakeTool::new());
    let extractor = ThumbnailExtractor::new(tool.clone());

    // zero frames requested
    let err = extractor
        .capture_timeline(&input, &metadata(30.0), 0)
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "Validation");

    // video too short for any spacing
    let err = extractor
        .capture_timeline(&input, &metadata(0.5), 4)
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "Validation");
}
