// Runtime settings shared by the binary and the adapters

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Log level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(DomainError::BadArgs(format!("Invalid log level: {}", other))),
        }
    }
}

/// How log records are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(DomainError::BadArgs(format!("Invalid log format: {}", other))),
        }
    }
}

/// Where job progress is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    #[default]
    Console,
    Json,
    None,
}

impl FromStr for ProgressMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(ProgressMode::Console),
            "json" => Ok(ProgressMode::Json),
            "none" | "off" => Ok(ProgressMode::None),
            other => Err(DomainError::BadArgs(format!("Invalid progress mode: {}", other))),
        }
    }
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FfwrapSettings {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub overwrite: bool,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    pub progress: ProgressMode,
}

impl Default for FfwrapSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            overwrite: true,
            log_level: LogLevel::Info,
            log_format: LogFormat::Pretty,
            progress: ProgressMode::Console,
        }
    }
}

/// One layer of the settings hierarchy; unset fields leave lower layers alone
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsOverlay {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub overwrite: Option<bool>,
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
    pub progress: Option<ProgressMode>,
}

impl SettingsOverlay {
    pub fn apply_to(&self, settings: &mut FfwrapSettings) {
        if let Some(path) = &self.ffmpeg_path {
            settings.ffmpeg_path = path.clone();
        }
        if let Some(path) = &self.ffprobe_path {
            settings.ffprobe_path = path.clone();
        }
        if let Some(overwrite) = self.overwrite {
            settings.overwrite = overwrite;
        }
        if let Some(level) = self.log_level {
            settings.log_level = level;
        }
        if let Some(format) = self.log_format {
            settings.log_format = format;
        }
        if let Some(progress) = self.progress {
            settings.progress = progress;
        }
    }
}
