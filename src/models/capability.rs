//! Trait definition for pose estimators.

use betagen_common::PoseResult;
use image::RgbImage;

/// A pose estimator, independent of its backend.
///
/// The pipeline creates one instance per run through the
/// [`ModelRegistry`](super::ModelRegistry), calls [`load`](Self::load) once,
/// then alternates [`infer`](Self::infer) on sampled frames with
/// [`visualize`](Self::visualize) on every frame. Instances are never shared
/// between runs, so implementations may keep per-video state (trackers,
/// smoothing) without synchronization.
pub trait PoseModel: Send {
    /// Short, lowercase identifier for this estimator (e.g. `"mediapipe"`).
    fn name(&self) -> &'static str;

    /// Load weights and runtimes.
    ///
    /// Repeated calls after a successful load are no-ops. An estimator whose
    /// backend cannot be loaded must still leave itself usable, in whatever
    /// degraded mode it chooses.
    fn load(&mut self);

    /// Detect a pose in `frame`.
    fn infer(&mut self, frame: &RgbImage) -> anyhow::Result<PoseResult>;

    /// Return an annotated copy of `frame` showing `result`.
    fn visualize(&self, frame: &RgbImage, result: &PoseResult) -> RgbImage;
}
