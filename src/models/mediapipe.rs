//! BlazePose-topology estimator.
//!
//! No inference runtime ships with betagen, so this estimator always runs in
//! degraded mode: it reports a fixed, low-confidence upper-body placeholder
//! scaled to the frame. The output keeps the full result shape so downstream
//! consumers can be exercised end to end.

use betagen_common::{PoseKeypoint, PoseResult};
use image::RgbImage;

use super::capability::PoseModel;
use super::skeleton::render_pose;

const SHOULDER_CONFIDENCE: f32 = 0.25;
const HIP_CONFIDENCE: f32 = 0.2;
const PLACEHOLDER_CONFIDENCE: f32 = 0.23;

/// Degraded MediaPipe-style pose estimator.
#[derive(Debug, Default)]
pub struct MediaPipePoseModel {
    loaded: bool,
}

impl MediaPipePoseModel {
    pub fn new() -> Self {
        Self { loaded: false }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn placeholder(width: f32, height: f32) -> PoseResult {
        let keypoints = vec![
            PoseKeypoint::new("11", width * 0.42, height * 0.35, SHOULDER_CONFIDENCE),
            PoseKeypoint::new("12", width * 0.58, height * 0.35, SHOULDER_CONFIDENCE),
            PoseKeypoint::new("23", width * 0.45, height * 0.55, HIP_CONFIDENCE),
            PoseKeypoint::new("24", width * 0.55, height * 0.55, HIP_CONFIDENCE),
        ];
        let bbox = [width * 0.35, height * 0.25, width * 0.65, height * 0.70];
        PoseResult::new(keypoints, PLACEHOLDER_CONFIDENCE, Some(bbox))
    }
}

impl PoseModel for MediaPipePoseModel {
    fn name(&self) -> &'static str {
        "mediapipe"
    }

    fn load(&mut self) {
        if self.loaded {
            return;
        }
        tracing::warn!("No pose inference runtime available, mediapipe runs in placeholder mode");
        self.loaded = true;
    }

    fn infer(&mut self, frame: &RgbImage) -> anyhow::Result<PoseResult> {
        let (width, height) = frame.dimensions();
        Ok(Self::placeholder(width as f32, height as f32))
    }

    fn visualize(&self, frame: &RgbImage, result: &PoseResult) -> RgbImage {
        render_pose(frame, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_is_idempotent() {
        let mut model = MediaPipePoseModel::new();
        assert!(!model.is_loaded());
        model.load();
        model.load();
        assert!(model.is_loaded());
    }

    #[test]
    fn test_placeholder_scales_with_frame() {
        let mut model = MediaPipePoseModel::new();
        model.load();
        let result = model.infer(&RgbImage::new(200, 100)).unwrap();

        assert_eq!(result.keypoints.len(), 4);
        let names: Vec<_> = result.keypoints.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["11", "12", "23", "24"]);

        let left_shoulder = &result.keypoints[0];
        assert!((left_shoulder.x - 84.0).abs() < 1e-3);
        assert!((left_shoulder.y - 35.0).abs() < 1e-3);
        assert!((left_shoulder.confidence - 0.25).abs() < 1e-6);

        assert!((result.confidence - 0.23).abs() < 1e-6);
        let bbox = result.bbox.unwrap();
        assert!((bbox[0] - 70.0).abs() < 1e-3);
        assert!((bbox[3] - 70.0).abs() < 1e-3);
    }

    #[test]
    fn test_confidences_within_unit_range() {
        let mut model = MediaPipePoseModel::new();
        let result = model.infer(&RgbImage::new(64, 48)).unwrap();
        assert!((0.0..=1.0).contains(&result.confidence));
        assert!(result
            .keypoints
            .iter()
            .all(|k| (0.0..=1.0).contains(&k.confidence)));
    }

    #[test]
    fn test_visualize_keeps_dimensions() {
        let model = MediaPipePoseModel::new();
        let frame = RgbImage::new(64, 48);
        let result = MediaPipePoseModel::placeholder(64.0, 48.0);
        let rendered = model.visualize(&frame, &result);
        assert_eq!(rendered.dimensions(), (64, 48));
        assert_ne!(rendered, frame);
    }
}
