//! Pose records and the persisted keypoints document.
//!
//! Coordinates are frame-space pixels of the (possibly resampled) frame the
//! estimator saw. Every confidence value is clamped into `[0.0, 1.0]` when a
//! record is constructed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::VideoId;

/// Keypoints at or below this confidence are excluded from the bounding box
/// and from overlay rendering.
pub const VISIBILITY_THRESHOLD: f32 = 0.2;

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A single detected body landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseKeypoint {
    /// Landmark label or index (e.g. `"11"` for the left shoulder).
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl PoseKeypoint {
    pub fn new(name: impl Into<String>, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            confidence: clamp_unit(confidence),
        }
    }

    /// Whether the keypoint clears [`VISIBILITY_THRESHOLD`].
    pub fn is_visible(&self) -> bool {
        self.confidence > VISIBILITY_THRESHOLD
    }
}

/// Output of one estimator invocation on one frame.
///
/// The default value is the "no detection" result used for frames skipped by
/// sampling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseResult {
    pub keypoints: Vec<PoseKeypoint>,
    pub confidence: f32,
    /// `[min_x, min_y, max_x, max_y]` over the visible keypoints.
    pub bbox: Option<[f32; 4]>,
}

impl PoseResult {
    pub fn new(keypoints: Vec<PoseKeypoint>, confidence: f32, bbox: Option<[f32; 4]>) -> Self {
        Self {
            keypoints,
            confidence: clamp_unit(confidence),
            bbox,
        }
    }

    /// Build a result from raw landmarks.
    ///
    /// The aggregate confidence is the mean keypoint confidence and the bbox
    /// spans the keypoints above [`VISIBILITY_THRESHOLD`]; it is `None` when no
    /// keypoint qualifies.
    pub fn from_keypoints(keypoints: Vec<PoseKeypoint>) -> Self {
        if keypoints.is_empty() {
            return Self::default();
        }

        let sum: f32 = keypoints.iter().map(|kp| kp.confidence).sum();
        let confidence = sum / keypoints.len() as f32;

        let bbox = keypoints
            .iter()
            .filter(|kp| kp.is_visible())
            .fold(None, |acc: Option<[f32; 4]>, kp| {
                Some(match acc {
                    None => [kp.x, kp.y, kp.x, kp.y],
                    Some([x0, y0, x1, y1]) => [x0.min(kp.x), y0.min(kp.y), x1.max(kp.x), y1.max(kp.y)],
                })
            });

        Self::new(keypoints, confidence, bbox)
    }

    /// True when nothing was detected.
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Pose result for one decoded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePoseRecord {
    pub frame_index: u64,
    pub keypoints: Vec<PoseKeypoint>,
    pub confidence: f32,
    pub bbox: Option<[f32; 4]>,
}

impl FramePoseRecord {
    pub fn new(frame_index: u64, result: PoseResult) -> Self {
        Self {
            frame_index,
            keypoints: result.keypoints,
            confidence: result.confidence,
            bbox: result.bbox,
        }
    }
}

/// Run metadata stored alongside the frame records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadMeta {
    pub fps: f64,
    pub total_frames: u64,
    /// Resolved `"<width>x<height>"` of the overlay.
    pub output_resolution: String,
    pub every_n_frames: u32,
}

/// The `keypoints.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointsPayload {
    pub video_id: VideoId,
    pub model: String,
    pub frames: Vec<FramePoseRecord>,
    pub meta: PayloadMeta,
}

/// Kinds of artifacts a processing run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Keypoints,
    Overlay,
    FramesDir,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keypoints => "keypoints",
            Self::Overlay => "overlay",
            Self::FramesDir => "frames_dir",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keypoints" => Ok(Self::Keypoints),
            "overlay" => Ok(Self::Overlay),
            "frames_dir" => Ok(Self::FramesDir),
            other => Err(crate::Error::invalid_input(format!(
                "unknown artifact type '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        let kp = PoseKeypoint::new("0", 1.0, 2.0, 1.7);
        assert_eq!(kp.confidence, 1.0);
        let kp = PoseKeypoint::new("0", 1.0, 2.0, -0.3);
        assert_eq!(kp.confidence, 0.0);
        let kp = PoseKeypoint::new("0", 1.0, 2.0, f32::NAN);
        assert_eq!(kp.confidence, 0.0);

        let result = PoseResult::new(Vec::new(), 3.0, None);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_default_result_is_empty() {
        let result = PoseResult::default();
        assert!(result.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert!(result.bbox.is_none());
    }

    #[test]
    fn test_from_keypoints_bbox_uses_visible_points_only() {
        let result = PoseResult::from_keypoints(vec![
            PoseKeypoint::new("0", 10.0, 20.0, 0.9),
            PoseKeypoint::new("1", 30.0, 5.0, 0.5),
            PoseKeypoint::new("2", 100.0, 100.0, 0.1),
        ]);

        assert_eq!(result.bbox, Some([10.0, 5.0, 30.0, 20.0]));
        assert!((result.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_from_keypoints_without_visible_points_has_no_bbox() {
        let result = PoseResult::from_keypoints(vec![PoseKeypoint::new("0", 1.0, 1.0, 0.2)]);
        assert!(result.bbox.is_none());
        assert_eq!(result.keypoints.len(), 1);
    }

    #[test]
    fn test_frame_record_json_shape() {
        let record = FramePoseRecord::new(3, PoseResult::default());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["frame_index"], 3);
        assert_eq!(json["keypoints"], serde_json::json!([]));
        assert_eq!(json["confidence"], 0.0);
        assert!(json["bbox"].is_null());
    }

    #[test]
    fn test_payload_parses_back() {
        let payload = KeypointsPayload {
            video_id: VideoId::parse("abc123def456").unwrap(),
            model: "mediapipe".to_string(),
            frames: vec![
                FramePoseRecord::new(
                    0,
                    PoseResult::from_keypoints(vec![PoseKeypoint::new("11", 4.0, 5.0, 0.8)]),
                ),
                FramePoseRecord::new(1, PoseResult::default()),
            ],
            meta: PayloadMeta {
                fps: 10.0,
                total_frames: 2,
                output_resolution: "64x48".to_string(),
                every_n_frames: 2,
            },
        };

        let json = serde_json::to_string_pretty(&payload).unwrap();
        let parsed: KeypointsPayload = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.video_id, payload.video_id);
        assert_eq!(parsed.model, payload.model);
        assert_eq!(parsed.frames.len(), 2);
        assert_eq!(parsed.meta, payload.meta);
    }

    #[test]
    fn test_artifact_kind_names() {
        assert_eq!(ArtifactKind::FramesDir.to_string(), "frames_dir");
        assert_eq!("overlay".parse::<ArtifactKind>().unwrap(), ArtifactKind::Overlay);
        assert!("thumbnail".parse::<ArtifactKind>().is_err());

        let mut map = std::collections::BTreeMap::new();
        map.insert(ArtifactKind::Keypoints, "k.json");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"keypoints":"k.json"}"#);
    }
}
