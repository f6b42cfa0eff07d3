//! On-disk layout for uploaded videos and their processing outputs.
//!
//! ```text
//! <data_root>/
//!   uploads/<video_id>.<ext>
//!   outputs/<video_id>/keypoints.json
//!   outputs/<video_id>/overlay.mp4
//!   outputs/<video_id>/frames/000000.jpg ...
//! ```

mod error;

pub use error::{Result, StorageError};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use betagen_common::paths::{is_accepted_video, lowercase_extension};
use betagen_common::{ArtifactKind, VideoId};

use crate::config::StorageConfig;
use crate::pipeline::{FRAMES_DIRNAME, KEYPOINTS_FILENAME, OVERLAY_FILENAME};

/// Uploads and outputs directories.
#[derive(Debug, Clone)]
pub struct VideoStore {
    uploads_dir: PathBuf,
    outputs_dir: PathBuf,
}

impl VideoStore {
    pub fn new(uploads_dir: impl Into<PathBuf>, outputs_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            outputs_dir: outputs_dir.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.uploads_dir(), config.outputs_dir())
    }

    /// Create the uploads and outputs roots if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.uploads_dir)?;
        fs::create_dir_all(&self.outputs_dir)?;
        Ok(())
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn outputs_dir(&self) -> &Path {
        &self.outputs_dir
    }

    /// Directory holding the artifacts of `video_id`.
    pub fn output_dir(&self, video_id: &VideoId) -> PathBuf {
        self.outputs_dir.join(video_id.as_str())
    }

    /// Store uploaded bytes under a fresh video id.
    pub fn save_upload(&self, filename: &str, data: &[u8]) -> Result<(VideoId, PathBuf)> {
        let ext = accepted_extension(Path::new(filename))?;
        if data.is_empty() {
            return Err(StorageError::EmptyUpload);
        }

        let (video_id, dst) = self.new_upload_path(&ext)?;
        fs::write(&dst, data)?;
        tracing::info!("Saved upload {:?} as {}", filename, video_id);
        Ok((video_id, dst))
    }

    /// Copy a local file into the uploads directory under a fresh video id.
    pub fn register_local_video(&self, path: &Path) -> Result<(VideoId, PathBuf)> {
        if !path.is_file() {
            return Err(StorageError::FileNotFound(path.to_path_buf()));
        }
        let ext = accepted_extension(path)?;

        let (video_id, dst) = self.new_upload_path(&ext)?;
        fs::copy(path, &dst)?;
        tracing::info!("Registered {:?} as {}", path, video_id);
        Ok((video_id, dst))
    }

    fn new_upload_path(&self, ext: &str) -> Result<(VideoId, PathBuf)> {
        fs::create_dir_all(&self.uploads_dir)?;
        let video_id = VideoId::generate();
        let dst = self
            .uploads_dir
            .join(format!("{}.{}", video_id.as_str(), ext));
        Ok((video_id, dst))
    }

    /// Path of the stored upload for `video_id`.
    ///
    /// When several files share the id, the lexicographically first wins.
    pub fn resolve_uploaded_video(&self, video_id: &VideoId) -> Result<PathBuf> {
        let entries = match fs::read_dir(&self.uploads_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::VideoNotFound(video_id.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        let prefix = format!("{}.", video_id.as_str());
        let mut matches: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        matches.sort();

        matches
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::VideoNotFound(video_id.clone()))
    }

    /// Artifacts that currently exist for `video_id`.
    pub fn list_result_files(&self, video_id: &VideoId) -> Result<BTreeMap<ArtifactKind, PathBuf>> {
        let out = self.output_dir(video_id);
        if !out.is_dir() {
            return Err(StorageError::ResultsNotFound(video_id.clone()));
        }

        let mut files = BTreeMap::new();
        let keypoints = out.join(KEYPOINTS_FILENAME);
        if keypoints.is_file() {
            files.insert(ArtifactKind::Keypoints, keypoints);
        }
        let overlay = out.join(OVERLAY_FILENAME);
        if overlay.is_file() {
            files.insert(ArtifactKind::Overlay, overlay);
        }
        let frames = out.join(FRAMES_DIRNAME);
        if frames.is_dir() {
            files.insert(ArtifactKind::FramesDir, frames);
        }
        Ok(files)
    }

    /// Path of a downloadable artifact. Only `overlay` and `keypoints` are
    /// single files; anything else is rejected.
    pub fn resolve_output_file(&self, video_id: &VideoId, kind: &str) -> Result<PathBuf> {
        let filename = match kind.parse::<ArtifactKind>() {
            Ok(ArtifactKind::Overlay) => OVERLAY_FILENAME,
            Ok(ArtifactKind::Keypoints) => KEYPOINTS_FILENAME,
            _ => return Err(StorageError::UnknownArtifact(kind.to_string())),
        };

        let path = self.output_dir(video_id).join(filename);
        if !path.is_file() {
            return Err(StorageError::FileNotFound(path));
        }
        Ok(path)
    }
}

fn accepted_extension(path: &Path) -> Result<String> {
    match lowercase_extension(path) {
        Some(ext) if is_accepted_video(path) => Ok(ext),
        Some(ext) => Err(StorageError::UnsupportedExtension(format!(".{}", ext))),
        None => Err(StorageError::UnsupportedExtension(String::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extension() {
        assert_eq!(accepted_extension(Path::new("a.MP4")).unwrap(), "mp4");
        assert_eq!(accepted_extension(Path::new("b.mov")).unwrap(), "mov");
        assert!(matches!(
            accepted_extension(Path::new("c.avi")),
            Err(StorageError::UnsupportedExtension(ext)) if ext == ".avi"
        ));
        assert!(accepted_extension(Path::new("noext")).is_err());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(StorageError::VideoNotFound(VideoId::generate()).is_not_found());
        assert!(!StorageError::EmptyUpload.is_not_found());
    }
}
