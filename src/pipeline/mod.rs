//! Video processing pipeline.
//!
//! [`VideoProcessor::run`] turns one source video into a keypoints document
//! and an overlay video. It is synchronous and blocking; the job orchestrator
//! runs it on a blocking thread.

mod error;
mod processor;
mod resolution;

pub use error::{PipelineError, Result};
pub use processor::{
    Artifacts, ProcessingConfig, VideoProcessor, FALLBACK_FPS, FRAMES_DIRNAME,
    KEYPOINTS_FILENAME, OVERLAY_FILENAME,
};
pub use resolution::OutputResolution;
