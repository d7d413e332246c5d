//! Technical metadata extracted from media files

use serde::{Deserialize, Serialize};

/// Metadata probed from a video file.
///
/// Every field is optional: the probe captures an allow-list of keys and a
/// given container may not report all of them. Numeric fields hold parsed
/// values, never raw probe text. `duration` is fractional seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<f64>,
    pub bit_rate: Option<u64>,
    pub codec_name: Option<String>,
    pub codec_long_name: Option<String>,
    pub format_name: Option<String>,
    pub frame_count: Option<u64>,
    pub size: Option<u64>,
}

impl VideoMetadata {
    /// True if the probe captured nothing usable.
    pub fn is_empty(&self) -> bool {
        *self == VideoMetadata::default()
    }

    /// Source dimensions, when both are known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }
}
