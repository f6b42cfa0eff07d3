//! Per-video processing: decode, infer, render, persist.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use betagen_av::{MediaBackend, SinkSpec};
use betagen_common::{
    ArtifactKind, FramePoseRecord, KeypointsPayload, PayloadMeta, PoseKeypoint, PoseResult,
    VideoId,
};
use image::imageops::{self, FilterType};
use tracing::{debug, info};

use super::error::{PipelineError, Result};
use super::resolution::OutputResolution;
use crate::models::ModelRegistry;

/// Frame rate assumed when the source reports none.
pub const FALLBACK_FPS: f64 = 30.0;

pub const KEYPOINTS_FILENAME: &str = "keypoints.json";
pub const OVERLAY_FILENAME: &str = "overlay.mp4";
pub const FRAMES_DIRNAME: &str = "frames";

/// Effective settings for one run, after per-job overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingConfig {
    pub model: String,
    pub every_n_frames: u32,
    /// `"original"` or `"<width>x<height>"`.
    pub output_resolution: String,
    pub save_intermediate_frames: bool,
}

/// Artifact paths produced by a successful run.
pub type Artifacts = BTreeMap<ArtifactKind, PathBuf>;

/// Runs pose estimation over whole videos.
///
/// Holds no per-run state; one processor can serve any number of concurrent
/// runs, each of which creates its own estimator instance.
#[derive(Clone)]
pub struct VideoProcessor {
    registry: Arc<ModelRegistry>,
    backend: Arc<dyn MediaBackend>,
    max_video_seconds: u64,
}

impl VideoProcessor {
    pub fn new(
        registry: Arc<ModelRegistry>,
        backend: Arc<dyn MediaBackend>,
        max_video_seconds: u64,
    ) -> Self {
        Self {
            registry,
            backend,
            max_video_seconds,
        }
    }

    pub fn max_video_seconds(&self) -> u64 {
        self.max_video_seconds
    }

    /// Process `input` and write artifacts under `output_dir`.
    ///
    /// Always produces `keypoints.json` and `overlay.mp4`; rendered frames go
    /// to `output_dir/frames` when requested. A video longer than the
    /// configured limit is rejected before either file is created.
    pub fn run(
        &self,
        video_id: &VideoId,
        input: &Path,
        output_dir: &Path,
        config: &ProcessingConfig,
    ) -> Result<Artifacts> {
        if config.every_n_frames == 0 {
            return Err(PipelineError::InvalidSamplingInterval(config.every_n_frames));
        }

        let keypoints_path = output_dir.join(KEYPOINTS_FILENAME);
        let overlay_path = output_dir.join(OVERLAY_FILENAME);
        let frames_dir = output_dir.join(FRAMES_DIRNAME);

        fs::create_dir_all(output_dir)?;
        if config.save_intermediate_frames {
            fs::create_dir_all(&frames_dir)?;
        }

        let mut model = self.registry.create(&config.model)?;

        let mut source =
            self.backend
                .open_source(input)
                .map_err(|source| PipelineError::OpenSource {
                    path: input.to_path_buf(),
                    source,
                })?;
        let info = source.info();

        let fps = if info.fps > 0.0 { info.fps } else { FALLBACK_FPS };

        if let Some(frame_count) = info.frame_count.filter(|&n| n > 0) {
            let duration = frame_count as f64 / fps;
            if duration > self.max_video_seconds as f64 {
                return Err(PipelineError::VideoTooLong {
                    duration,
                    max: self.max_video_seconds,
                });
            }
        }

        let resolution: OutputResolution = config.output_resolution.parse()?;
        let (out_width, out_height) = resolution.resolve(info.width, info.height);
        let output_resolution = format!("{}x{}", out_width, out_height);

        debug!(
            "Processing {} with {}: {}x{} @ {} fps -> {}, every {} frame(s)",
            video_id,
            model.name(),
            info.width,
            info.height,
            fps,
            output_resolution,
            config.every_n_frames
        );

        let spec = SinkSpec {
            width: out_width,
            height: out_height,
            fps,
        };
        let mut sink =
            self.backend
                .open_sink(&overlay_path, &spec)
                .map_err(|source| PipelineError::OpenWriter {
                    path: overlay_path.clone(),
                    source,
                })?;

        let mut frames = Vec::new();
        let mut frame_index: u64 = 0;

        while let Some(frame) = source.next_frame()? {
            let frame = if frame.dimensions() != (out_width, out_height) {
                imageops::resize(&frame, out_width, out_height, FilterType::Triangle)
            } else {
                frame
            };

            let result = if frame_index % u64::from(config.every_n_frames) == 0 {
                let raw = model
                    .infer(&frame)
                    .map_err(|source| PipelineError::Model {
                        frame_index,
                        source,
                    })?;
                normalize(raw)
            } else {
                PoseResult::default()
            };

            let rendered = model.visualize(&frame, &result);
            sink.write_frame(&rendered)?;

            if config.save_intermediate_frames {
                rendered.save(frames_dir.join(format!("{:06}.jpg", frame_index)))?;
            }

            frames.push(FramePoseRecord::new(frame_index, result));
            frame_index += 1;
        }

        drop(source);
        sink.finish()?;

        let payload = KeypointsPayload {
            video_id: video_id.clone(),
            model: config.model.clone(),
            frames,
            meta: PayloadMeta {
                fps,
                total_frames: frame_index,
                output_resolution,
                every_n_frames: config.every_n_frames,
            },
        };
        fs::write(&keypoints_path, serde_json::to_string_pretty(&payload)?)?;

        info!(
            "Processed {} frames of {} into {:?}",
            frame_index, video_id, output_dir
        );

        let mut artifacts = Artifacts::new();
        artifacts.insert(ArtifactKind::Keypoints, keypoints_path);
        artifacts.insert(ArtifactKind::Overlay, overlay_path);
        if config.save_intermediate_frames {
            artifacts.insert(ArtifactKind::FramesDir, frames_dir);
        }
        Ok(artifacts)
    }
}

/// Re-clamp confidences coming from an estimator.
fn normalize(result: PoseResult) -> PoseResult {
    let keypoints = result
        .keypoints
        .into_iter()
        .map(|kp| PoseKeypoint::new(kp.name, kp.x, kp.y, kp.confidence))
        .collect();
    PoseResult::new(keypoints, result.confidence, result.bbox)
}
