use std::path::PathBuf;

use betagen_common::VideoId;

/// Errors from the uploads/outputs file layout.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Video '{0}' not found")]
    VideoNotFound(VideoId),

    #[error("No output found for video '{0}'")]
    ResultsNotFound(VideoId),

    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("Only .mp4 and .mov are supported, got {0:?}")]
    UnsupportedExtension(String),

    #[error("Uploaded file is empty")]
    EmptyUpload,

    #[error("Unknown artifact type '{0}': expected overlay or keypoints")]
    UnknownArtifact(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether the error means something requested does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::VideoNotFound(_) | Self::ResultsNotFound(_) | Self::FileNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
