//! CLI end-to-end tests
//!
//! Tests for the betagen command-line interface. None of these need ffmpeg.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the betagen binary
#[allow(deprecated)]
fn betagen_cmd() -> Command {
    Command::cargo_bin("betagen").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = betagen_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = betagen_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("betagen"))
        .stdout(predicate::str::contains("process"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = betagen_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "betagen {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_models_command() {
    let mut cmd = betagen_cmd();
    cmd.arg("models")
        .assert()
        .success()
        .stdout(predicate::eq("mediapipe\nopenpose\n"));
}

#[test]
fn test_cli_process_help() {
    let mut cmd = betagen_cmd();
    cmd.args(["process", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--every-n-frames"))
        .stdout(predicate::str::contains("--output-resolution"));
}

#[test]
fn test_cli_process_missing_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("betagen.toml");
    fs::write(
        &config_path,
        format!(
            "[storage]\ndata_root = {:?}\n",
            dir.path().join("data").to_string_lossy()
        ),
    )
    .unwrap();

    let mut cmd = betagen_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .args(["process", "/nonexistent/path/climb.mp4"])
        .assert()
        .failure();
}

#[test]
fn test_cli_process_rejects_unsupported_extension() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("betagen.toml");
    fs::write(
        &config_path,
        format!(
            "[storage]\ndata_root = {:?}\n",
            dir.path().join("data").to_string_lossy()
        ),
    )
    .unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(&input, b"not a video").unwrap();

    let mut cmd = betagen_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains(".mp4"));
}

#[test]
fn test_cli_results_unknown_video() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("betagen.toml");
    fs::write(
        &config_path,
        format!(
            "[storage]\ndata_root = {:?}\n",
            dir.path().join("data").to_string_lossy()
        ),
    )
    .unwrap();

    let mut cmd = betagen_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .args(["results", "abc123def456"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No output found"));
}

#[test]
fn test_cli_validate_valid_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[pose]\ndefault_model = \"mediapipe\"\nevery_n_frames = 2\n",
    )
    .unwrap();

    let mut cmd = betagen_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"))
        .stdout(predicate::str::contains("mediapipe"));
}

#[test]
fn test_cli_validate_invalid_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[pose]\noutput_resolution = \"0x100\"\n").unwrap();

    let mut cmd = betagen_cmd();
    cmd.arg("validate").arg(&config_path).assert().failure();
}

#[test]
fn test_cli_probe_nonexistent_file() {
    let mut cmd = betagen_cmd();
    cmd.args(["probe", "/nonexistent/path/to/file.mp4"])
        .assert()
        .failure();
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = betagen_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"));
}

#[cfg(unix)]
#[test]
fn test_cli_check_tools_uses_configured_paths() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let ffprobe = dir.path().join("custom-ffprobe");
    fs::write(&ffprobe, "#!/bin/sh\necho 'ffprobe version 0.0-custom'\n").unwrap();
    fs::set_permissions(&ffprobe, fs::Permissions::from_mode(0o755)).unwrap();

    let config_path = dir.path().join("betagen.toml");
    fs::write(
        &config_path,
        format!("[tools]\nffprobe_path = '{}'\n", ffprobe.display()),
    )
    .unwrap();

    let mut cmd = betagen_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0-custom"))
        .stdout(predicate::str::contains(ffprobe.display().to_string()));
}

#[test]
fn test_cli_process_help_lists_no_save_frames() {
    let mut cmd = betagen_cmd();
    cmd.args(["process", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-save-frames"));
}
