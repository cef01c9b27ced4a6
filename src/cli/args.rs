//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use clap_num::number_range;

use crate::domain::model::TimeSpec;

/// Highest crf any supported encoder accepts (libsvtav1)
const MAX_CRF: u8 = 63;

fn parse_crf(s: &str) -> Result<u8, String> {
    number_range(s, 0, MAX_CRF)
}

/// Video encoder selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VideoCodecArg {
    #[default]
    Copy,
    Libx264,
    Libsvtav1,
}

/// Audio encoder selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AudioCodecArg {
    #[default]
    Copy,
    Aac,
    Ac3,
    Libopus,
}

/// Arguments for the transcode command
#[derive(Args, Debug)]
pub struct TranscodeArgs {
    /// Input media file; repeat for several inputs
    #[arg(short, long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output start time (HH:MM:SS.ffff, MM:SS, or seconds)
    #[arg(long)]
    pub start: Option<TimeSpec>,

    /// Output stop time
    #[arg(long)]
    pub stop: Option<TimeSpec>,

    /// Output duration; wins over --stop
    #[arg(long)]
    pub duration: Option<TimeSpec>,

    /// Video encoder
    #[arg(long, value_enum, default_value_t = VideoCodecArg::Copy)]
    pub video_codec: VideoCodecArg,

    /// Audio encoder
    #[arg(long, value_enum, default_value_t = AudioCodecArg::Copy)]
    pub audio_codec: AudioCodecArg,

    /// Audio bitrate in kbit/s
    #[arg(long)]
    pub audio_bitrate: Option<u32>,

    /// Constant Rate Factor
    #[arg(long, value_parser = parse_crf)]
    pub crf: Option<u8>,

    /// Encoder preset (x264 names, or 0-8 for libsvtav1)
    #[arg(long)]
    pub preset: Option<String>,

    /// Scale video to this height, keeping the aspect ratio
    #[arg(long)]
    pub scale: Option<u32>,

    /// Deinterlace video
    #[arg(long)]
    pub deinterlace: bool,

    /// Language tag for audio and subtitle streams
    #[arg(long)]
    pub language: Option<String>,

    /// Output title metadata
    #[arg(long)]
    pub title: Option<String>,

    /// Stop writing once the output reaches this many bytes
    #[arg(long)]
    pub size_limit: Option<u64>,

    /// Remove audio streams
    #[arg(long)]
    pub no_audio: bool,

    /// Remove subtitle streams
    #[arg(long)]
    pub no_subs: bool,

    /// Print the ffmpeg command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the concat command
#[derive(Args, Debug)]
pub struct ConcatArgs {
    /// Files to join, in order
    #[arg(required = true, num_args = 2..)]
    pub files: Vec<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Add one chapter per joined file
    #[arg(long)]
    pub chapters: bool,

    /// Output title metadata
    #[arg(long)]
    pub title: Option<String>,

    /// Print the ffmpeg command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input media file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
