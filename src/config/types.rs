use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub pose: PoseConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    #[serde(default = "default_uploads_dirname")]
    pub uploads_dirname: String,

    #[serde(default = "default_outputs_dirname")]
    pub outputs_dirname: String,
}

impl StorageConfig {
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_root.join(&self.uploads_dirname)
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.data_root.join(&self.outputs_dirname)
    }
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}
fn default_uploads_dirname() -> String {
    "uploads".to_string()
}
fn default_outputs_dirname() -> String {
    "outputs".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            uploads_dirname: default_uploads_dirname(),
            outputs_dirname: default_outputs_dirname(),
        }
    }
}

/// Process-wide processing defaults and limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoseConfig {
    /// Model used when a request names none
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Run inference on every n-th frame (>= 1)
    #[serde(default = "default_every_n_frames")]
    pub every_n_frames: u32,

    /// "original" or "<width>x<height>"
    #[serde(default = "default_output_resolution")]
    pub output_resolution: String,

    #[serde(default)]
    pub save_intermediate_frames: bool,

    /// Videos longer than this are rejected before any frame is processed
    #[serde(default = "default_max_video_seconds")]
    pub max_video_seconds: u64,

    /// Upper bound on pipelines running at the same time
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

fn default_model() -> String {
    "openpose".to_string()
}
fn default_every_n_frames() -> u32 {
    1
}
fn default_output_resolution() -> String {
    "original".to_string()
}
fn default_max_video_seconds() -> u64 {
    180
}
fn default_max_concurrent_jobs() -> usize {
    2
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            every_n_frames: default_every_n_frames(),
            output_resolution: default_output_resolution(),
            save_intermediate_frames: false,
            max_video_seconds: default_max_video_seconds(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    /// Encoder for overlay videos (`-c:v`)
    #[serde(default = "default_overlay_codec")]
    pub overlay_codec: String,
}

fn default_overlay_codec() -> String {
    "mpeg4".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            overlay_codec: default_overlay_codec(),
        }
    }
}
