//! Pose estimation capabilities.
//!
//! This module defines the [`PoseModel`] trait every estimator implements,
//! the [`ModelRegistry`] that maps model names to constructors, and the
//! built-in estimators registered at startup.

pub mod capability;
pub mod mediapipe;
pub mod openpose;
pub mod registry;
pub mod skeleton;

pub use capability::PoseModel;
pub use mediapipe::MediaPipePoseModel;
pub use openpose::OpenPoseModel;
pub use registry::{ModelFactory, ModelRegistry, UnsupportedModelError};
