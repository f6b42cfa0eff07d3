//! Video information types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Information about the primary video stream of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Path to the media file.
    pub file_path: PathBuf,
    /// Video codec (e.g., "h264", "hevc").
    pub codec: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Frame rate in FPS, when the stream reports a usable one.
    pub frame_rate: Option<f64>,
    /// Number of frames, when the container records it.
    pub frame_count: Option<u64>,
    /// Container duration.
    pub duration: Option<Duration>,
    /// Display rotation in degrees clockwise: 0, 90, 180 or 270.
    #[serde(default)]
    pub rotation: u32,
}

impl VideoInfo {
    /// Width and height formatted as `"<w>x<h>"`.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Frame size after applying the display rotation, which is what an
    /// auto-rotating decoder emits.
    pub fn display_dimensions(&self) -> (u32, u32) {
        if self.rotation % 180 == 90 {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}
