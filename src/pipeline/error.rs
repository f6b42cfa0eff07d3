use std::path::PathBuf;

use crate::models::UnsupportedModelError;

/// Errors raised while processing a single video.
///
/// Every variant ends a run; the job orchestrator records the message as the
/// job's failure reason.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    UnsupportedModel(#[from] UnsupportedModelError),

    #[error("Invalid output_resolution '{0}': expected 'original' or '<width>x<height>' with positive integers")]
    InvalidResolution(String),

    #[error("every_n_frames must be at least 1, got {0}")]
    InvalidSamplingInterval(u32),

    #[error("Video too long ({duration:.2}s). Max allowed: {max}s")]
    VideoTooLong { duration: f64, max: u64 },

    #[error("Cannot open video {path:?}: {source}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: betagen_av::Error,
    },

    #[error("Cannot initialize overlay writer {path:?}: {source}")]
    OpenWriter {
        path: PathBuf,
        #[source]
        source: betagen_av::Error,
    },

    #[error("Media error: {0}")]
    Media(#[from] betagen_av::Error),

    #[error("Pose inference failed on frame {frame_index}: {source:#}")]
    Model {
        frame_index: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("Cannot write frame image: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
