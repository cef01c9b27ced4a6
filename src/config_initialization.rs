//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use crate::adapters::toml_config::TomlConfigAdapter;
use crate::cli::Cli;
use crate::domain::model::{FfwrapSettings, SettingsOverlay};
use crate::error::{FfwrapError, FfwrapResult};

pub const ENV_FFMPEG: &str = "FFWRAP_FFMPEG";
pub const ENV_FFPROBE: &str = "FFWRAP_FFPROBE";
pub const ENV_OVERWRITE: &str = "FFWRAP_OVERWRITE";
pub const ENV_LOG_LEVEL: &str = "FFWRAP_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "FFWRAP_LOG_FORMAT";
pub const ENV_PROGRESS: &str = "FFWRAP_PROGRESS";

/// Resolve settings with precedence CLI > Env > File > Defaults
pub fn initialize_settings(cli: &Cli) -> FfwrapResult<FfwrapSettings> {
    let mut settings = FfwrapSettings::default();

    if let Some(path) = config_file(cli.config.as_deref()) {
        TomlConfigAdapter::load(&path)?.apply_to(&mut settings);
    }
    environment_overlay(|key| std::env::var(key).ok())?.apply_to(&mut settings);
    cli_overlay(cli).apply_to(&mut settings);

    Ok(settings)
}

fn config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => TomlConfigAdapter::discover(Path::new(".")),
    }
}

fn config_error(key: &str, err: impl std::fmt::Display) -> FfwrapError {
    FfwrapError::ConfigError {
        message: format!("{}: {}", key, err),
    }
}

fn parse_bool(key: &str, value: &str) -> FfwrapResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(config_error(key, format!("expected a boolean, got '{}'", other))),
    }
}

/// Settings taken from environment variables, read through `lookup`
pub fn environment_overlay(lookup: impl Fn(&str) -> Option<String>) -> FfwrapResult<SettingsOverlay> {
    let mut overlay = SettingsOverlay {
        ffmpeg_path: lookup(ENV_FFMPEG).map(PathBuf::from),
        ffprobe_path: lookup(ENV_FFPROBE).map(PathBuf::from),
        ..Default::default()
    };

    if let Some(value) = lookup(ENV_OVERWRITE) {
        overlay.overwrite = Some(parse_bool(ENV_OVERWRITE, &value)?);
    }
    if let Some(value) = lookup(ENV_LOG_LEVEL) {
        overlay.log_level = Some(value.parse().map_err(|e| config_error(ENV_LOG_LEVEL, e))?);
    }
    if let Some(value) = lookup(ENV_LOG_FORMAT) {
        overlay.log_format = Some(value.parse().map_err(|e| config_error(ENV_LOG_FORMAT, e))?);
    }
    if let Some(value) = lookup(ENV_PROGRESS) {
        overlay.progress = Some(value.parse().map_err(|e| config_error(ENV_PROGRESS, e))?);
    }

    Ok(overlay)
}

/// Settings given as global command-line flags
pub fn cli_overlay(cli: &Cli) -> SettingsOverlay {
    SettingsOverlay {
        ffmpeg_path: cli.ffmpeg.clone(),
        ffprobe_path: cli.ffprobe.clone(),
        overwrite: cli.no_overwrite.then_some(false),
        log_level: cli.log_level,
        log_format: cli.log_format,
        progress: cli.progress,
    }
}
