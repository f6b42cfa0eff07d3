//! Frame-level video I/O.
//!
//! A [`FrameSource`] yields decoded frames in presentation order and a
//! [`FrameSink`] encodes rendered frames into a video file. Both own their
//! underlying resources and release them when dropped, so a caller that
//! bails out halfway (an estimator error, a full disk) never leaks a decoder
//! or encoder process.

mod ffmpeg;

pub use ffmpeg::FfmpegBackend;

use crate::Result;
use image::RgbImage;
use std::path::Path;

/// Properties of an opened source stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    /// Frame rate as reported by the source; `0.0` when it reports none.
    pub fps: f64,
    /// Frame count, when the container records it.
    pub frame_count: Option<u64>,
}

/// Geometry and rate of an output video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkSpec {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl SinkSpec {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(crate::Error::InvalidInput(format!(
                "output dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(crate::Error::InvalidInput(format!(
                "output frame rate must be positive, got {}",
                self.fps
            )));
        }
        Ok(())
    }
}

/// Ordered stream of decoded RGB frames.
pub trait FrameSource: Send {
    fn info(&self) -> StreamInfo;

    /// Next decoded frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Encoder accepting frames of exactly the geometry it was opened with.
pub trait FrameSink: Send {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Flush and close the output, reporting encoder failures.
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Opens sources and sinks.
pub trait MediaBackend: Send + Sync {
    fn open_source(&self, path: &Path) -> Result<Box<dyn FrameSource>>;

    fn open_sink(&self, path: &Path, spec: &SinkSpec) -> Result<Box<dyn FrameSink>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_spec_validation() {
        let ok = SinkSpec {
            width: 64,
            height: 48,
            fps: 10.0,
        };
        assert!(ok.validate().is_ok());

        assert!(SinkSpec { width: 0, ..ok }.validate().is_err());
        assert!(SinkSpec { height: 0, ..ok }.validate().is_err());
        assert!(SinkSpec { fps: 0.0, ..ok }.validate().is_err());
        assert!(SinkSpec { fps: f64::NAN, ..ok }.validate().is_err());
    }
}
