//! Betagen-Common: Shared types and utilities.
//!
//! This crate provides common functionality used across betagen:
//!
//! - **Typed IDs**: wrappers for job and video identifiers
//! - **Pose Records**: keypoints, per-frame results, and the persisted keypoints document
//! - **Path Utilities**: accepted upload extensions
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use betagen_common::{JobId, PoseResult, VideoId};
//! use betagen_common::paths::is_accepted_video;
//! use std::path::Path;
//!
//! let job_id = JobId::new();
//! let video_id = VideoId::generate();
//! assert_eq!(video_id.as_str().len(), 12);
//!
//! // Skipped frames carry an empty result.
//! let empty = PoseResult::default();
//! assert_eq!(empty.confidence, 0.0);
//!
//! assert!(is_accepted_video(Path::new("climb.MOV")));
//! # let _ = job_id;
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
