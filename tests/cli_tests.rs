use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ffwrap() -> Command {
    let mut cmd = Command::cargo_bin("ffwrap").unwrap();
    for var in [
        "FFWRAP_FFMPEG",
        "FFWRAP_FFPROBE",
        "FFWRAP_OVERWRITE",
        "FFWRAP_LOG_LEVEL",
        "FFWRAP_LOG_FORMAT",
        "FFWRAP_PROGRESS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    ffwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("transcode"))
        .stdout(predicate::str::contains("concat"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_transcode_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    ffwrap()
        .current_dir(dir.path())
        .args(["transcode", "-i", "missing.mkv", "-o", "out.mp4", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file does not exist"));
}

#[test]
fn test_inspect_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    ffwrap()
        .current_dir(dir.path())
        .args(["inspect", "-i", "missing.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.mkv"));
}

#[test]
fn test_invalid_time_rejected() {
    ffwrap()
        .args(["transcode", "-i", "a.mkv", "-o", "out.mp4", "--start", "ten"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--start"));
}

#[test]
fn test_bad_environment_value_fails() {
    let dir = TempDir::new().unwrap();
    ffwrap()
        .current_dir(dir.path())
        .env("FFWRAP_OVERWRITE", "sometimes")
        .args(["inspect", "-i", "missing.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FFWRAP_OVERWRITE"));
}

#[test]
fn test_malformed_config_file_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ffwrap.toml"), "[ffwrap]\noverwrite = \"maybe\"\n").unwrap();
    ffwrap()
        .current_dir(dir.path())
        .args(["inspect", "-i", "missing.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}
