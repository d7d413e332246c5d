//! Test doubles for the external tool seam

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use clipforge_core::{AppError, AppResult};

use crate::tool::VideoTool;

/// One recorded invocation on a [`FakeTool`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    Probe {
        path: PathBuf,
    },
    Transcode {
        input: PathBuf,
        output: PathBuf,
        args: Vec<String>,
    },
    CaptureFrame {
        input: PathBuf,
        output: PathBuf,
        at_seconds: f64,
    },
    CaptureFrames {
        input: PathBuf,
        pattern: PathBuf,
        step_seconds: f64,
        frames: u32,
    },
}

const DEFAULT_VIDEO_PROBE: &str = "\
[STREAM]
index=0
codec_name=h264
codec_long_name=H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10
codec_type=video
width=1280
height=720
duration=30.000000
bit_rate=1205959
nb_frames=900
[/STREAM]
[STREAM]
index=1
codec_name=aac
codec_long_name=AAC (Advanced Audio Coding)
codec_type=audio
duration=30.023000
bit_rate=127999
[/STREAM]
[FORMAT]
format_name=mov,mp4,m4a,3gp,3g2,mj2
size=4567890
duration=30.023000
bit_rate=1216000
[/FORMAT]
";

const DEFAULT_IMAGE_PROBE: &str = "\
[STREAM]
index=0
codec_name=png
codec_long_name=PNG (Portable Network Graphics) image
codec_type=video
width=1280
height=720
[/STREAM]
[FORMAT]
format_name=image2
size=8192
[/FORMAT]
";

/// Canned [`VideoTool`] for tests: records every call, writes fixed bytes
/// where the real tool would write media, and answers probes with fixture
/// text (image fixtures for `.png`/`.bmp` paths, video fixtures otherwise).
pub struct FakeTool {
    video_probe: String,
    image_probe: String,
    output_content: Vec<u8>,
    fail_transcode: AtomicBool,
    fail_capture: AtomicBool,
    calls: Mutex<Vec<ToolCall>>,
}

impl Default for FakeTool {
    fn default() -> Self {
        FakeTool {
            video_probe: DEFAULT_VIDEO_PROBE.to_string(),
            image_probe: DEFAULT_IMAGE_PROBE.to_string(),
            output_content: b"transcoded bytes".to_vec(),
            fail_transcode: AtomicBool::new(false),
            fail_capture: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video_probe(mut self, raw: impl Into<String>) -> Self {
        self.video_probe = raw.into();
        self
    }

    pub fn with_output_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.output_content = content.into();
        self
    }

    /// Make every subsequent transcode fail with a `ToolInvocation` error.
    pub fn fail_transcodes(&self) {
        self.fail_transcode.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent frame capture fail.
    pub fn fail_captures(&self) {
        self.fail_capture.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The recorded transcode invocations, in order.
    pub fn transcodes(&self) -> Vec<ToolCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ToolCall::Transcode { .. }))
            .collect()
    }

    fn record(&self, call: ToolCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }

    fn is_image(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("png") | Some("bmp") | Some("jpg") | Some("jpeg")
        )
    }
}

#[async_trait]
impl VideoTool for FakeTool {
    async fn probe(&self, path: &Path) -> AppResult<String> {
        self.record(ToolCall::Probe {
            path: path.to_path_buf(),
        });
        if Self::is_image(path) {
            Ok(self.image_probe.clone())
        } else {
            Ok(self.video_probe.clone())
        }
    }

    async fn transcode(&self, input: &Path, output: &Path, args: &[String]) -> AppResult<()> {
        self.record(ToolCall::Transcode {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            args: args.to_vec(),
        });
        if self.fail_transcode.load(Ordering::SeqCst) {
            return Err(AppError::ToolInvocation("fake transcode failure".to_string()));
        }
        tokio::fs::write(output, &self.output_content).await?;
        Ok(())
    }

    async fn capture_frame(&self, input: &Path, output: &Path, at_seconds: f64) -> AppResult<()> {
        self.record(ToolCall::CaptureFrame {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            at_seconds,
        });
        if self.fail_capture.load(Ordering::SeqCst) {
            return Err(AppError::ToolInvocation("fake capture failure".to_string()));
        }
        tokio::fs::write(output, &self.output_content).await?;
        Ok(())
    }

    async fn capture_frames(
        &self,
        input: &Path,
        pattern: &Path,
        step_seconds: f64,
        frames: u32,
    ) -> AppResult<()> {
        self.record(ToolCall::CaptureFrames {
            input: input.to_path_buf(),
            pattern: pattern.to_path_buf(),
            step_seconds,
            frames,
        });
        if self.fail_capture.load(Ordering::SeqCst) {
            return Err(AppError::ToolInvocation("fake capture failure".to_string()));
        }

        let template = pattern.to_string_lossy();
        for index in 0..frames {
            let path = template.replace("%d", &index.to_string());
            tokio::fs::write(&path, &self.output_content).await?;
        }
        Ok(())
    }
}
