//! Shared test doubles for integration tests.
//!
//! [`SyntheticBackend`] stands in for ffmpeg: its sources generate solid-color
//! frames in memory and its sinks record what was written. [`StubModel`] is a
//! deterministic pose estimator; [`FailingModel`] errors on every frame.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use betagen::config::Config;
use betagen::models::{ModelRegistry, PoseModel};
use betagen_av::{FrameSink, FrameSource, MediaBackend, SinkSpec, StreamInfo};
use betagen_common::{PoseKeypoint, PoseResult};
use image::{Rgb, RgbImage};
use parking_lot::Mutex;
use tempfile::TempDir;

/// Geometry and length of a generated video.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticVideo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frames: u64,
    /// Whether the source reports `frames` as its frame count.
    pub reports_frame_count: bool,
    /// Pause before each frame is returned.
    pub frame_delay: Duration,
}

impl SyntheticVideo {
    pub fn new(width: u32, height: u32, fps: f64, frames: u64) -> Self {
        Self {
            width,
            height,
            fps,
            frames,
            reports_frame_count: true,
            frame_delay: Duration::ZERO,
        }
    }
}

/// Everything the sinks of a [`SyntheticBackend`] received.
#[derive(Debug, Default)]
pub struct SinkLog {
    pub specs: Vec<SinkSpec>,
    pub frame_sizes: Vec<(u32, u32)>,
    pub finished: usize,
}

/// In-memory [`MediaBackend`].
///
/// Opening a source requires the input path to exist. Sinks create the
/// output file and append one byte per frame so callers can see it exists.
pub struct SyntheticBackend {
    video: SyntheticVideo,
    pub log: Arc<Mutex<SinkLog>>,
    active_sources: Arc<AtomicUsize>,
    pub max_active_sources: Arc<AtomicUsize>,
}

impl SyntheticBackend {
    pub fn new(video: SyntheticVideo) -> Self {
        Self {
            video,
            log: Arc::new(Mutex::new(SinkLog::default())),
            active_sources: Arc::new(AtomicUsize::new(0)),
            max_active_sources: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MediaBackend for SyntheticBackend {
    fn open_source(&self, path: &Path) -> betagen_av::Result<Box<dyn FrameSource>> {
        if !path.exists() {
            return Err(betagen_av::Error::file_not_found(path));
        }

        let now = self.active_sources.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_sources.fetch_max(now, Ordering::SeqCst);

        Ok(Box::new(SyntheticSource {
            video: self.video,
            next: 0,
            active: Arc::clone(&self.active_sources),
        }))
    }

    fn open_sink(&self, path: &Path, spec: &SinkSpec) -> betagen_av::Result<Box<dyn FrameSink>> {
        let file = File::create(path)?;
        self.log.lock().specs.push(*spec);
        Ok(Box::new(RecordingSink {
            file,
            spec: *spec,
            log: Arc::clone(&self.log),
        }))
    }
}

struct SyntheticSource {
    video: SyntheticVideo,
    next: u64,
    active: Arc<AtomicUsize>,
}

impl FrameSource for SyntheticSource {
    fn info(&self) -> StreamInfo {
        StreamInfo {
            width: self.video.width,
            height: self.video.height,
            fps: self.video.fps,
            frame_count: self
                .video
                .reports_frame_count
                .then_some(self.video.frames),
        }
    }

    fn next_frame(&mut self) -> betagen_av::Result<Option<RgbImage>> {
        if self.next >= self.video.frames {
            return Ok(None);
        }
        if !self.video.frame_delay.is_zero() {
            std::thread::sleep(self.video.frame_delay);
        }
        let shade = (self.next % 256) as u8;
        self.next += 1;
        Ok(Some(RgbImage::from_pixel(
            self.video.width,
            self.video.height,
            Rgb([shade, shade, shade]),
        )))
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

struct RecordingSink {
    file: File,
    spec: SinkSpec,
    log: Arc<Mutex<SinkLog>>,
}

impl FrameSink for RecordingSink {
    fn write_frame(&mut self, frame: &RgbImage) -> betagen_av::Result<()> {
        if frame.dimensions() != (self.spec.width, self.spec.height) {
            return Err(betagen_av::Error::InvalidInput(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width(),
                frame.height(),
                self.spec.width,
                self.spec.height
            )));
        }
        self.file.write_all(&[0u8])?;
        self.log.lock().frame_sizes.push(frame.dimensions());
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> betagen_av::Result<()> {
        self.file.flush()?;
        self.log.lock().finished += 1;
        Ok(())
    }
}

/// Estimator that reports one fully confident keypoint at the frame center.
#[derive(Debug, Default)]
pub struct StubModel;

impl PoseModel for StubModel {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn load(&mut self) {}

    fn infer(&mut self, frame: &RgbImage) -> anyhow::Result<PoseResult> {
        let (w, h) = frame.dimensions();
        Ok(PoseResult::from_keypoints(vec![PoseKeypoint::new(
            "0",
            w as f32 / 2.0,
            h as f32 / 2.0,
            1.0,
        )]))
    }

    fn visualize(&self, frame: &RgbImage, _result: &PoseResult) -> RgbImage {
        frame.clone()
    }
}

/// Estimator whose inference always fails.
#[derive(Debug, Default)]
pub struct FailingModel;

impl PoseModel for FailingModel {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn load(&mut self) {}

    fn infer(&mut self, _frame: &RgbImage) -> anyhow::Result<PoseResult> {
        anyhow::bail!("detector crashed")
    }

    fn visualize(&self, frame: &RgbImage, _result: &PoseResult) -> RgbImage {
        frame.clone()
    }
}

/// Built-in models plus `stub` and `failing`.
pub fn test_registry() -> ModelRegistry {
    let mut registry = ModelRegistry::with_builtin_models();
    registry.register("stub", || Box::new(StubModel));
    registry.register("failing", || Box::new(FailingModel));
    registry
}

/// Scratch data root with a placeholder input video.
pub struct Workspace {
    pub dir: TempDir,
    pub input: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("climb.mp4");
        std::fs::write(&input, b"synthetic").unwrap();
        Self { dir, input }
    }

    /// Default configuration rooted in this workspace.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.storage.data_root = self.dir.path().join("data");
        config
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }
}
