//! ffmpeg-backed frame I/O over raw `rgb24` pipes.

use super::{FrameSink, FrameSource, MediaBackend, SinkSpec, StreamInfo};
use crate::probe::probe_with_ffprobe;
use crate::{Error, Result};
use image::RgbImage;
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

const DEFAULT_CODEC: &str = "mpeg4";

/// [`MediaBackend`] that decodes and encodes through `ffmpeg` child processes.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    codec: String,
}

impl FfmpegBackend {
    /// Use `ffmpeg`/`ffprobe` from `PATH` and the MPEG-4 Part 2 encoder.
    pub fn new() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            codec: DEFAULT_CODEC.to_string(),
        }
    }

    pub fn with_tools(mut self, ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        self.ffmpeg = ffmpeg.into();
        self.ffprobe = ffprobe.into();
        self
    }

    /// Encoder passed to `-c:v` for overlay output.
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe(&self) -> &Path {
        &self.ffprobe
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaBackend for FfmpegBackend {
    fn open_source(&self, path: &Path) -> Result<Box<dyn FrameSource>> {
        let probed = probe_with_ffprobe(&self.ffprobe, path)?;
        // ffmpeg applies the display matrix, so rotated streams decode transposed.
        let (width, height) = probed.display_dimensions();
        let info = StreamInfo {
            width,
            height,
            fps: probed.frame_rate.unwrap_or(0.0),
            frame_count: probed.frame_count,
        };

        let mut child = Command::new(&self.ffmpeg)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::from_spawn(&self.ffmpeg, e))?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::tool_failed("ffmpeg", "decoder stdout unavailable"));
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Opened decoder for {:?} ({}x{}, {} fps, {:?} frames)",
            path,
            info.width,
            info.height,
            info.fps,
            info.frame_count
        );

        Ok(Box::new(FfmpegFrameSource {
            child,
            reader: BufReader::new(stdout),
            frame_len: info.width as usize * info.height as usize * 3,
            info,
        }))
    }

    fn open_sink(&self, path: &Path, spec: &SinkSpec) -> Result<Box<dyn FrameSink>> {
        spec.validate()?;

        let mut child = Command::new(&self.ffmpeg)
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-s", &format!("{}x{}", spec.width, spec.height)])
            .args(["-r", &format!("{}", spec.fps)])
            .args(["-i", "-", "-an", "-c:v", &self.codec, "-pix_fmt", "yuv420p"])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::from_spawn(&self.ffmpeg, e))?;

        let stdin = match child.stdin.take() {
            Some(stdin) => stdin,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::tool_failed("ffmpeg", "encoder stdin unavailable"));
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Opened encoder for {:?} ({}x{} @ {} fps, {})",
            path,
            spec.width,
            spec.height,
            spec.fps,
            self.codec
        );

        Ok(Box::new(FfmpegFrameSink {
            child,
            stdin: Some(stdin),
            spec: *spec,
        }))
    }
}

struct FfmpegFrameSource {
    child: Child,
    reader: BufReader<ChildStdout>,
    info: StreamInfo,
    frame_len: usize,
}

impl FrameSource for FfmpegFrameSource {
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0;

        while filled < self.frame_len {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        if filled < self.frame_len {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "Decoder ended mid-frame ({} of {} bytes), dropping partial frame",
                filled,
                self.frame_len
            );
            return Ok(None);
        }

        RgbImage::from_raw(self.info.width, self.info.height, buf)
            .map(Some)
            .ok_or_else(|| Error::parse_error("ffmpeg", "frame buffer size mismatch"))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        // The decoder may still be producing frames; stop it rather than drain.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

struct FfmpegFrameSink {
    child: Child,
    stdin: Option<ChildStdin>,
    spec: SinkSpec,
}

impl FrameSink for FfmpegFrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.width() != self.spec.width || frame.height() != self.spec.height {
            return Err(Error::InvalidInput(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width(),
                frame.height(),
                self.spec.width,
                self.spec.height
            )));
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::tool_failed("ffmpeg", "encoder already closed"))?;

        stdin.write_all(frame.as_raw()).map_err(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                Error::tool_failed("ffmpeg", "encoder exited unexpectedly")
            } else {
                Error::Io(e)
            }
        })
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        drop(self.stdin.take());
        let status = self.child.wait()?;
        if !status.success() {
            return Err(Error::tool_failed(
                "ffmpeg",
                format!("encoder exited with {}", status),
            ));
        }
        Ok(())
    }
}

impl Drop for FfmpegFrameSink {
    fn drop(&mut self) {
        // Closing stdin lets ffmpeg finalize whatever was written so far.
        if self.stdin.take().is_some() {
            let _ = self.child.wait();
        }
    }
}
