//! Locating the ffmpeg binaries the frame pipeline shells out to.

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One of the two ffmpeg-suite programs betagen depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaTool {
    Ffmpeg,
    Ffprobe,
}

impl MediaTool {
    /// Executable name looked up on `PATH`.
    pub fn binary_name(&self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
            Self::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for MediaTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// Result of running a media tool's `-version`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub tool: MediaTool,
    /// Program that was executed.
    pub program: PathBuf,
    /// Release reported by the banner, e.g. `6.1.1`.
    pub version: Option<String>,
    pub available: bool,
}

/// Resolve the program to run for `tool`.
///
/// An existing `configured` path wins. Otherwise, including when the
/// configured path does not exist, the tool is looked up on `PATH`.
pub fn locate(tool: MediaTool, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        #[cfg(feature = "tracing")]
        tracing::warn!(
            "Configured {} path {:?} does not exist, falling back to PATH",
            tool,
            path
        );
    }

    which::which(tool.binary_name()).map_err(|_| Error::tool_not_found(tool.binary_name()))
}

/// Run `program -version` and report what it says.
pub fn inspect(tool: MediaTool, program: &Path) -> ToolStatus {
    let output = Command::new(program).arg("-version").output();

    let version = match output {
        Ok(output) if output.status.success() => Some(
            String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .and_then(|line| parse_version_banner(tool, line))
                .unwrap_or_else(|| "unknown".to_string()),
        ),
        _ => None,
    };

    ToolStatus {
        tool,
        program: program.to_path_buf(),
        available: version.is_some(),
        version,
    }
}

/// Inspect ffmpeg and ffprobe, honouring configured paths the same way the
/// frame backend does.
pub fn check_media_tools(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Vec<ToolStatus> {
    [(MediaTool::Ffmpeg, ffmpeg), (MediaTool::Ffprobe, ffprobe)]
        .into_iter()
        .map(|(tool, configured)| {
            let program = locate(tool, configured).unwrap_or_else(|_| {
                configured
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(tool.binary_name()))
            });
            inspect(tool, &program)
        })
        .collect()
}

/// Pull the release out of a banner like `ffmpeg version 6.1.1-3ubuntu5 Copyright ...`.
fn parse_version_banner(tool: MediaTool, line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix(tool.binary_name())?;
    let rest = rest.trim_start().strip_prefix("version")?;
    rest.split_whitespace().next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_banner() {
        assert_eq!(
            parse_version_banner(
                MediaTool::Ffmpeg,
                "ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023 the FFmpeg developers"
            )
            .as_deref(),
            Some("6.1.1-3ubuntu5")
        );
        assert_eq!(
            parse_version_banner(MediaTool::Ffprobe, "ffprobe version n7.0 Copyright").as_deref(),
            Some("n7.0")
        );
        assert_eq!(parse_version_banner(MediaTool::Ffmpeg, "ffprobe version 6.1"), None);
        assert_eq!(parse_version_banner(MediaTool::Ffmpeg, "garbage"), None);
    }

    #[test]
    fn test_inspect_missing_program() {
        let status = inspect(MediaTool::Ffmpeg, Path::new("/nonexistent/bin/ffmpeg_12345"));
        assert!(!status.available);
        assert!(status.version.is_none());
        assert_eq!(status.program, Path::new("/nonexistent/bin/ffmpeg_12345"));
    }

    #[test]
    fn test_configured_path_wins() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = locate(MediaTool::Ffprobe, Some(file.path())).unwrap();
        assert_eq!(path, file.path());
    }

    #[cfg(unix)]
    #[test]
    fn test_check_media_tools_runs_configured_programs() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffprobe");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'ffprobe version 9.9-test Copyright'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let missing = dir.path().join("no-ffmpeg");
        let statuses = check_media_tools(Some(missing.as_path()), Some(script.as_path()));

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].tool, MediaTool::Ffmpeg);
        assert_eq!(statuses[1].tool, MediaTool::Ffprobe);
        assert_eq!(statuses[1].program, script);
        assert!(statuses[1].available);
        assert_eq!(statuses[1].version.as_deref(), Some("9.9-test"));
    }
}
