//! Configuration module
//!
//! Settings are read from the environment once at startup and passed
//! explicitly into the components that need them; nothing reads ambient
//! configuration at call time.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 300;
const DEFAULT_STORAGE_PATH: &str = "media/fs";

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Settings for external tool invocation (probe, transcode, capture).
#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Maximum wall-clock wait for a single external process before it is
    /// treated as failed.
    pub tool_timeout_secs: u64,
}

impl ProcessingConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let tool_timeout_secs = env::var("CLIPFORGE_TOOL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOOL_TIMEOUT_SECS);

        ProcessingConfig {
            ffmpeg_path: env_or("CLIPFORGE_FFMPEG_PATH", DEFAULT_FFMPEG_PATH),
            ffprobe_path: env_or("CLIPFORGE_FFPROBE_PATH", DEFAULT_FFPROBE_PATH),
            tool_timeout_secs,
        }
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        ProcessingConfig {
            ffmpeg_path: DEFAULT_FFMPEG_PATH.to_string(),
            ffprobe_path: DEFAULT_FFPROBE_PATH.to_string(),
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

/// Settings for the versioned media store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Root directory all record filenames resolve under.
    pub storage_root: PathBuf,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        StoreConfig {
            storage_root: PathBuf::from(env_or("CLIPFORGE_STORAGE_PATH", DEFAULT_STORAGE_PATH)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProcessingConfig::default();
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.tool_timeout(), Duration::from_secs(300));
    }
}
