use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "betagen")]
#[command(author, version, about = "Pose estimation for climbing videos")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a local video, run pose estimation on it and print the job
    Process {
        /// Video to process (.mp4 or .mov)
        #[arg(required = true)]
        file: PathBuf,

        /// Pose model (defaults to pose.default_model)
        #[arg(short, long)]
        model: Option<String>,

        /// Run inference on every n-th frame
        #[arg(long)]
        every_n_frames: Option<u32>,

        /// "original" or "<width>x<height>"
        #[arg(long)]
        output_resolution: Option<String>,

        /// Also save every rendered frame as a JPEG
        #[arg(long, conflicts_with = "no_save_frames")]
        save_frames: bool,

        /// Skip per-frame JPEGs even if the config enables them
        #[arg(long)]
        no_save_frames: bool,
    },

    /// List the artifacts produced for a video
    Results {
        /// Video id printed by `process`
        video_id: String,
    },

    /// List available pose models
    Models,

    /// Probe a video file and display stream information
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Per-run override for saving intermediate frames; `None` keeps the config value.
pub fn frame_saving_override(save_frames: bool, no_save_frames: bool) -> Option<bool> {
    match (save_frames, no_save_frames) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
