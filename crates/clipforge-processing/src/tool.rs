//! External tool capability
//!
//! Probe, transcode and frame capture are reached through [`VideoTool`] so
//! the pipeline logic never depends on real binaries being present.
//! [`FfmpegTool`] is the local-binary implementation;
//! [`crate::testing::FakeTool`] is the canned double used in tests.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use clipforge_core::{AppError, AppResult, ProcessingConfig};
use tokio::process::Command;

#[async_trait]
pub trait VideoTool: Send + Sync {
    /// Run the probe against a local file and return its raw stdout.
    async fn probe(&self, path: &Path) -> AppResult<String>;

    /// Run a transcode from `input` to `output` with the given extra
    /// arguments (inserted between input and output).
    async fn transcode(&self, input: &Path, output: &Path, args: &[String]) -> AppResult<()>;

    /// Capture a single frame at `at_seconds` into `output`.
    async fn capture_frame(&self, input: &Path, output: &Path, at_seconds: f64) -> AppResult<()>;

    /// Capture `frames` evenly spaced frames (`step_seconds` apart) into
    /// files numbered from 0 according to `pattern` (a `%d` template).
    async fn capture_frames(
        &self,
        input: &Path,
        pattern: &Path,
        step_seconds: f64,
        frames: u32,
    ) -> AppResult<()>;
}

/// [`VideoTool`] backed by local ffmpeg/ffprobe binaries.
pub struct FfmpegTool {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

impl FfmpegTool {
    pub fn new(config: &ProcessingConfig) -> AppResult<Self> {
        validate_tool_path(&config.ffmpeg_path)?;
        validate_tool_path(&config.ffprobe_path)?;

        Ok(FfmpegTool {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            timeout: config.tool_timeout(),
        })
    }

    /// Run a command to completion, enforcing the configured timeout.
    /// Returns captured stdout; non-zero exit reports captured stderr.
    async fn run(&self, program: &str, args: &[String]) -> AppResult<Vec<u8>> {
        tracing::debug!(program = %program, args = ?args, "invoking external tool");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                AppError::ToolInvocation(format!(
                    "{} timed out after {}s",
                    program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::ToolInvocation(format!("Failed to execute {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::ToolInvocation(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl VideoTool for FfmpegTool {
    async fn probe(&self, path: &Path) -> AppResult<String> {
        let args = vec![
            "-show_streams".to_string(),
            "-show_format".to_string(),
            path.to_string_lossy().to_string(),
        ];
        let stdout = self.run(&self.ffprobe_path, &args).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    async fn transcode(&self, input: &Path, output: &Path, args: &[String]) -> AppResult<()> {
        let mut full_args = vec!["-i".to_string(), input.to_string_lossy().to_string()];
        full_args.extend_from_slice(args);
        full_args.push("-y".to_string());
        full_args.push(output.to_string_lossy().to_string());

        self.run(&self.ffmpeg_path, &full_args).await?;
        Ok(())
    }

    async fn capture_frame(&self, input: &Path, output: &Path, at_seconds: f64) -> AppResult<()> {
        let args = vec![
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-ss".to_string(),
            at_seconds.to_string(),
            "-vframes".to_string(),
            "1".to_string(),
            "-y".to_string(),
            output.to_string_lossy().to_string(),
        ];

        self.run(&self.ffmpeg_path, &args).await?;
        Ok(())
    }

    async fn capture_frames(
        &self,
        input: &Path,
        pattern: &Path,
        step_seconds: f64,
        frames: u32,
    ) -> AppResult<()> {
        let args = vec![
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vf".to_string(),
            format!("fps=1/{}", step_seconds),
            "-start_number".to_string(),
            "0".to_string(),
            "-vframes".to_string(),
            frames.to_string(),
            "-y".to_string(),
            pattern.to_string_lossy().to_string(),
        ];

        self.run(&self.ffmpeg_path, &args).await?;
        Ok(())
    }
}

/// Reject tool paths carrying shell metacharacters.
fn validate_tool_path(path: &str) -> AppResult<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(AppError::Validation(format!("Invalid tool path: {}", path)));
    }
    Ok(())
}
