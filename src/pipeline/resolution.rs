//! Output resolution negotiation.

use std::fmt;
use std::str::FromStr;

use super::error::PipelineError;

/// Target geometry for overlay frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputResolution {
    /// Keep whatever the source decodes to.
    #[default]
    Original,
    Fixed { width: u32, height: u32 },
}

impl OutputResolution {
    /// Dimensions to render at for a source of `src_width` x `src_height`.
    pub fn resolve(&self, src_width: u32, src_height: u32) -> (u32, u32) {
        match *self {
            Self::Original => (src_width, src_height),
            Self::Fixed { width, height } => (width, height),
        }
    }
}

impl FromStr for OutputResolution {
    type Err = PipelineError;

    /// Accepts `original` or `<width>x<height>`, both case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        if lowered == "original" {
            return Ok(Self::Original);
        }

        let invalid = || PipelineError::InvalidResolution(s.to_string());

        let mut parts = lowered.split('x');
        let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let width: i64 = w.trim().parse().map_err(|_| invalid())?;
        let height: i64 = h.trim().parse().map_err(|_| invalid())?;
        if width <= 0 || height <= 0 {
            return Err(invalid());
        }

        Ok(Self::Fixed {
            width: u32::try_from(width).map_err(|_| invalid())?,
            height: u32::try_from(height).map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for OutputResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Fixed { width, height } => write!(f, "{}x{}", width, height),
        }
    }
}
