mod types;

pub use types::*;

use crate::models::ModelRegistry;
use crate::pipeline::OutputResolution;
use anyhow::{Context, Result};
use betagen_av::{FfmpegBackend, MediaTool};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./betagen.toml",
        "~/.config/betagen/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let pose = &config.pose;

    if pose.every_n_frames == 0 {
        anyhow::bail!("pose.every_n_frames must be at least 1");
    }

    if pose.max_concurrent_jobs == 0 {
        anyhow::bail!("pose.max_concurrent_jobs must be at least 1");
    }

    if pose.max_video_seconds == 0 {
        anyhow::bail!("pose.max_video_seconds must be positive");
    }

    pose.output_resolution
        .parse::<OutputResolution>()
        .with_context(|| format!("Invalid pose.output_resolution '{}'", pose.output_resolution))?;

    let supported = ModelRegistry::with_builtin_models().supported_models();
    if !supported.contains(&pose.default_model.to_lowercase()) {
        anyhow::bail!(
            "pose.default_model '{}' is not a built-in model. Supported: {}",
            pose.default_model,
            supported.join(", ")
        );
    }

    if config.storage.uploads_dirname.is_empty() || config.storage.outputs_dirname.is_empty() {
        anyhow::bail!("storage directory names cannot be empty");
    }

    Ok(())
}

/// Build the ffmpeg backend described by the `[tools]` section.
pub fn media_backend(tools: &ToolsConfig) -> FfmpegBackend {
    let ffmpeg = betagen_av::locate(MediaTool::Ffmpeg, tools.ffmpeg_path.as_deref())
        .unwrap_or_else(|_| "ffmpeg".into());
    let ffprobe = betagen_av::locate(MediaTool::Ffprobe, tools.ffprobe_path.as_deref())
        .unwrap_or_else(|_| "ffprobe".into());

    FfmpegBackend::new()
        .with_tools(ffmpeg, ffprobe)
        .with_codec(tools.overlay_codec.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.pose.default_model, "openpose");
        assert_eq!(config.pose.every_n_frames, 1);
        assert_eq!(config.pose.output_resolution, "original");
        assert!(!config.pose.save_intermediate_frames);
        assert_eq!(config.pose.max_video_seconds, 180);
        assert_eq!(config.storage.uploads_dir(), Path::new("data/uploads"));
        assert_eq!(config.storage.outputs_dir(), Path::new("data/outputs"));
        assert_eq!(config.tools.overlay_codec, "mpeg4");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(
            r#"
            [pose]
            default_model = "mediapipe"
            every_n_frames = 3
            output_resolution = "640x360"

            [storage]
            data_root = "/srv/betagen"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.pose.default_model, "mediapipe");
        assert_eq!(config.pose.every_n_frames, 3);
        assert_eq!(config.pose.output_resolution, "640x360");
        assert_eq!(config.pose.max_video_seconds, 180);
        assert_eq!(
            config.storage.outputs_dir(),
            Path::new("/srv/betagen/outputs")
        );
    }

    #[test]
    fn test_rejects_zero_interval() {
        let file = write_config("[pose]\nevery_n_frames = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_rejects_bad_resolution() {
        let file = write_config("[pose]\noutput_resolution = \"320x\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("output_resolution"));
    }

    #[test]
    fn test_rejects_unknown_default_model() {
        let file = write_config("[pose]\ndefault_model = \"alphapose\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_config(Path::new("/nonexistent/betagen.toml")).is_err());
    }
}
