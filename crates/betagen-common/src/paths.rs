//! Path utilities for accepted upload types.

use std::path::Path;

/// Video extensions accepted for upload or local registration.
pub const ACCEPTED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];

/// Check if a path has an accepted video extension (case-insensitive).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use betagen_common::paths::is_accepted_video;
///
/// assert!(is_accepted_video(Path::new("boulder.mp4")));
/// assert!(is_accepted_video(Path::new("/tmp/attempt.MOV")));
/// assert!(!is_accepted_video(Path::new("notes.txt")));
/// ```
pub fn is_accepted_video(path: &Path) -> bool {
    lowercase_extension(path)
        .map(|ext| ACCEPTED_VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Lowercased extension of `path` without the leading dot.
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}
