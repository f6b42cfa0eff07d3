//! Video stream probing.
//!
//! Only the first video stream matters to the frame pipeline: its
//! dimensions, its frame rate and, when the container records it, its frame
//! count.

mod ffprobe;
mod types;

pub use ffprobe::probe_with_ffprobe;
pub use types::*;
