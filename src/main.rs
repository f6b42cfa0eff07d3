mod cli;

use betagen::config;
use betagen::jobs::{JobManager, JobOverrides};
use betagen::models::ModelRegistry;
use betagen::state::JobStatus;
use betagen::storage::VideoStore;
use betagen_common::VideoId;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "betagen=debug,betagen_av=debug,betagen_common=debug".to_string()
        } else {
            "betagen=info,betagen_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Process {
            file,
            model,
            every_n_frames,
            output_resolution,
            save_frames,
            no_save_frames,
        } => {
            let overrides = JobOverrides {
                every_n_frames,
                output_resolution,
                save_intermediate_frames: cli::frame_saving_override(save_frames, no_save_frames),
            };
            process_file(&file, cli.config.as_deref(), model, overrides)
        }
        Commands::Results { video_id } => show_results(&video_id, cli.config.as_deref()),
        Commands::Models => {
            for name in ModelRegistry::with_builtin_models().supported_models() {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Probe { file, json } => probe_file(&file, cli.config.as_deref(), json),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("betagen {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn process_file(
    input: &Path,
    config_path: Option<&Path>,
    model: Option<String>,
    overrides: JobOverrides,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let input = PathBuf::from(shellexpand::tilde(&input.to_string_lossy()).as_ref());
    let store = VideoStore::from_config(&config.storage);
    store
        .ensure_dirs()
        .context("Failed to create data directories")?;
    let (video_id, stored) = store
        .register_local_video(&input)
        .with_context(|| format!("Cannot register {:?}", input))?;

    let model = model.unwrap_or_else(|| config.pose.default_model.clone());
    let registry = Arc::new(ModelRegistry::with_builtin_models());
    let backend = Arc::new(config::media_backend(&config.tools));

    tracing::info!("Processing {:?} as video {}", input, video_id);

    let rt = tokio::runtime::Runtime::new()?;
    let job = rt.block_on(async {
        let manager = JobManager::new(&config, registry, backend);
        let record = manager.submit(video_id, stored, &model, overrides)?;
        manager.wait(&record.job_id).await
    })?;

    println!("{}", serde_json::to_string_pretty(&job)?);

    if job.status == JobStatus::Failed {
        anyhow::bail!(
            "Job {} failed: {}",
            job.job_id,
            job.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

fn show_results(video_id: &str, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let video_id = VideoId::parse(video_id)?;

    let store = VideoStore::from_config(&config.storage);
    let files = store.list_result_files(&video_id)?;

    let json = serde_json::json!({
        "video_id": video_id,
        "files": files,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let backend = config::media_backend(&config.tools);
    let info = betagen_av::probe::probe_with_ffprobe(backend.ffprobe(), file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("File: {}", info.file_path.display());
        println!("Codec: {}", info.codec);
        println!("Resolution: {}", info.resolution());
        match info.frame_rate {
            Some(fps) => println!("Frame rate: {:.3} fps", fps),
            None => println!("Frame rate: unknown"),
        }
        match info.frame_count {
            Some(frames) => println!("Frames: {}", frames),
            None => println!("Frames: unknown"),
        }
        if let Some(ref duration) = info.duration {
            let secs = duration.as_secs();
            println!("Duration: {:02}:{:02}", secs / 60, secs % 60);
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = betagen_av::check_media_tools(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let mut all_ok = true;

    for tool in &tools {
        if tool.available {
            println!(
                "✓ {} ({}) - {}",
                tool.tool,
                tool.version.as_deref().unwrap_or("unknown"),
                tool.program.display()
            );
        } else {
            all_ok = false;
            println!("✗ {} - {} not runnable", tool.tool, tool.program.display());
        }
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to process videos.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Uploads: {}", config.storage.uploads_dir().display());
    println!("  Outputs: {}", config.storage.outputs_dir().display());
    println!("  Default model: {}", config.pose.default_model);
    println!("  Every n frames: {}", config.pose.every_n_frames);
    println!("  Output resolution: {}", config.pose.output_resolution);
    println!("  Max video length: {}s", config.pose.max_video_seconds);
    println!("  Max concurrent jobs: {}", config.pose.max_concurrent_jobs);

    Ok(())
}
