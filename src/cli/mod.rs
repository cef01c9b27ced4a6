//! CLI module for ffwrap
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::model::{LogFormat, LogLevel, ProgressMode};

pub mod args;
pub mod commands;

pub use args::{AudioCodecArg, ConcatArgs, InspectArgs, TranscodeArgs, VideoCodecArg};

/// ffwrap
///
/// Assembles ffmpeg command lines from a declarative job description, runs
/// ffmpeg and reports its progress.
#[derive(Parser, Debug)]
#[command(name = "ffwrap")]
#[command(about = "ffwrap - ffmpeg jobs with live progress")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Settings file with an [ffwrap] table
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log record format (pretty, json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Refuse to replace an existing output file
    #[arg(long, global = true)]
    pub no_overwrite: bool,

    /// ffmpeg binary
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe binary
    #[arg(long, global = true)]
    pub ffprobe: Option<PathBuf>,

    /// Progress reporting (console, json, none)
    #[arg(long, global = true)]
    pub progress: Option<ProgressMode>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcode one or more inputs into a single output
    Transcode(TranscodeArgs),
    /// Join files end to end without re-encoding
    Concat(ConcatArgs),
    /// Inspect media file information
    Inspect(InspectArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ffwrap",
            "inspect",
            "-i",
            "movie.mp4",
            "--log-level",
            "debug",
            "--no-overwrite",
        ])
        .unwrap();

        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert!(cli.no_overwrite);
        assert!(matches!(cli.command, Commands::Inspect(_)));
    }

    #[test]
    fn test_transcode_arguments() {
        let cli = Cli::try_parse_from([
            "ffwrap",
            "transcode",
            "-i",
            "a.mkv",
            "-i",
            "b.mkv",
            "-o",
            "out.mp4",
            "--video-codec",
            "libx264",
            "--crf",
            "20",
            "--duration",
            "00:01:00",
        ])
        .unwrap();

        let Commands::Transcode(args) = cli.command else {
            panic!("expected transcode");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.video_codec, VideoCodecArg::Libx264);
        assert_eq!(args.crf, Some(20));
        assert_eq!(args.duration.map(|d| d.as_seconds()), Some(60.0));
    }

    #[test]
    fn test_crf_out_of_range_rejected() {
        let result = Cli::try_parse_from([
            "ffwrap", "transcode", "-i", "a.mkv", "-o", "out.mp4", "--crf", "70",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_concat_needs_two_files() {
        assert!(Cli::try_parse_from(["ffwrap", "concat", "one.mp4", "-o", "out.mp4"]).is_err());
        assert!(Cli::try_parse_from(["ffwrap", "concat", "one.mp4", "two.mp4", "-o", "out.mp4"]).is_ok());
    }
}
