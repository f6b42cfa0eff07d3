//! OpenPose-named estimator. Shares the MediaPipe implementation.

use betagen_common::PoseResult;
use image::RgbImage;

use super::capability::PoseModel;
use super::mediapipe::MediaPipePoseModel;

/// Pose estimator registered as `openpose`.
///
/// Delegates inference and rendering to [`MediaPipePoseModel`].
#[derive(Debug, Default)]
pub struct OpenPoseModel {
    inner: MediaPipePoseModel,
}

impl OpenPoseModel {
    pub fn new() -> Self {
        Self {
            inner: MediaPipePoseModel::new(),
        }
    }
}

impl PoseModel for OpenPoseModel {
    fn name(&self) -> &'static str {
        "openpose"
    }

    fn load(&mut self) {
        self.inner.load();
    }

    fn infer(&mut self, frame: &RgbImage) -> anyhow::Result<PoseResult> {
        self.inner.infer(frame)
    }

    fn visualize(&self, frame: &RgbImage, result: &PoseResult) -> RgbImage {
        self.inner.visualize(frame, result)
    }
}
