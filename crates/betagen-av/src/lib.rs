//! # betagen-av
//!
//! Video probing and frame-level I/O for betagen.
//!
//! This crate provides functionality for:
//! - Probing a video's primary stream (dimensions, frame rate, frame count) via ffprobe
//! - Decoding a video into ordered RGB frames ([`FrameSource`])
//! - Encoding RGB frames into an overlay video ([`FrameSink`])
//!
//! Both directions go through `ffmpeg` child processes exchanging raw `rgb24`
//! frames over pipes. The [`MediaBackend`] trait lets callers substitute a
//! different implementation (for instance an in-memory one in tests).
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use betagen_av::{FfmpegBackend, MediaBackend};
//! use std::path::Path;
//!
//! let backend = FfmpegBackend::new();
//! let mut source = backend.open_source(Path::new("/path/to/climb.mp4"))?;
//! let info = source.info();
//! println!("{}x{} @ {} fps", info.width, info.height, info.fps);
//! while let Some(frame) = source.next_frame()? {
//!     println!("frame {}x{}", frame.width(), frame.height());
//! }
//! # Ok::<(), betagen_av::Error>(())
//! ```

mod error;
pub mod frames;
pub mod probe;
pub mod tools;

// Re-exports
pub use error::{Error, Result};
pub use frames::{FfmpegBackend, FrameSink, FrameSource, MediaBackend, SinkSpec, StreamInfo};
pub use probe::VideoInfo;
pub use tools::{check_media_tools, locate, MediaTool, ToolStatus};

/// Probe a video file with the `ffprobe` found on `PATH`.
///
/// # Example
///
/// ```no_run
/// let info = betagen_av::probe("/path/to/climb.mp4")?;
/// println!("{:?} frames", info.frame_count);
/// # Ok::<(), betagen_av::Error>(())
/// ```
pub fn probe<P: AsRef<std::path::Path>>(path: P) -> Result<VideoInfo> {
    probe::probe_with_ffprobe(std::path::Path::new("ffprobe"), path.as_ref())
}
