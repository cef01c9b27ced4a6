// Domain models - Core types and data structures

use std::fmt;
use std::ops::{Add, Sub};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::errors::DomainError;

mod settings;
pub use settings::*;

/// Number of internal ticks per second. Four fractional digits survive a
/// format/parse round trip.
pub const TICKS_PER_SECOND: i64 = 10_000;

const FRACTION_DIGITS: usize = 4;

/// Signed elapsed time with a fixed sub-second precision of 1/10000 s.
///
/// The canonical text form is `[-]HH:MM:SS.ffff`. Hours are not wrapped at
/// 24, so a ten-hour value formats as `10:00:00.0000`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpec {
    ticks: i64,
}

impl TimeSpec {
    pub const ZERO: TimeSpec = TimeSpec { ticks: 0 };

    /// Create a TimeSpec from raw ticks
    pub const fn from_ticks(ticks: i64) -> Self {
        Self { ticks }
    }

    /// Create a TimeSpec from seconds, rounded to the nearest tick
    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            ticks: (seconds * TICKS_PER_SECOND as f64).round() as i64,
        }
    }

    /// Create a new TimeSpec from hours, minutes, seconds, milliseconds
    pub fn from_components(hours: u32, minutes: u32, seconds: u32, milliseconds: u32) -> Self {
        let whole = hours as i64 * 3600 + minutes as i64 * 60 + seconds as i64;
        Self {
            ticks: whole * TICKS_PER_SECOND + milliseconds as i64 * (TICKS_PER_SECOND / 1000),
        }
    }

    pub const fn ticks(&self) -> i64 {
        self.ticks
    }

    pub fn as_seconds(&self) -> f64 {
        self.ticks as f64 / TICKS_PER_SECOND as f64
    }

    pub fn is_zero(&self) -> bool {
        self.ticks == 0
    }

    pub fn is_negative(&self) -> bool {
        self.ticks < 0
    }

    /// Negative values become zero
    pub fn clamp_non_negative(self) -> Self {
        if self.ticks < 0 {
            Self::ZERO
        } else {
            self
        }
    }

    /// Parse a time value.
    ///
    /// Accepted forms are `[-]H:MM:SS[.f]`, `[-]MM:SS[.f]` and plain seconds
    /// such as `90.5`. Hours may exceed 24. Fractions keep at most four
    /// digits; extra digits are truncated.
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        if body.is_empty() {
            return Err(DomainError::InvalidFormat(format!("empty time value '{}'", time_str)));
        }

        let parts: Vec<&str> = body.split(':').collect();
        let (hours, minutes, seconds_part) = match parts.as_slice() {
            [seconds] => (0, 0, *seconds),
            [minutes, seconds] => (0, parse_unit(minutes, time_str)?, *seconds),
            [hours, minutes, seconds] => (
                parse_unit(hours, time_str)?,
                parse_unit(minutes, time_str)?,
                *seconds,
            ),
            _ => {
                return Err(DomainError::InvalidFormat(format!(
                    "'{}' is not a time value. Expected [-]HH:MM:SS[.ffff] or seconds",
                    time_str
                )))
            }
        };

        let (whole, fraction) = match seconds_part.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (seconds_part, ""),
        };
        let whole_seconds = parse_unit(whole, time_str)?;
        let fraction_ticks = parse_fraction(fraction, time_str)?;

        if parts.len() > 1 {
            if minutes >= 60 && parts.len() == 3 {
                return Err(DomainError::InvalidFormat(format!(
                    "minutes must be less than 60 in '{}'",
                    time_str
                )));
            }
            if whole_seconds >= 60 {
                return Err(DomainError::InvalidFormat(format!(
                    "seconds must be less than 60 in '{}'",
                    time_str
                )));
            }
        }

        let total = hours
            .checked_mul(3600)
            .and_then(|s| minutes.checked_mul(60).and_then(|m| s.checked_add(m)))
            .and_then(|s| s.checked_add(whole_seconds))
            .and_then(|s| s.checked_mul(TICKS_PER_SECOND))
            .and_then(|ticks| ticks.checked_add(fraction_ticks))
            .ok_or_else(|| DomainError::InvalidFormat(format!("'{}' is out of range", time_str)))?;

        Ok(Self {
            ticks: if negative { -total } else { total },
        })
    }

    /// Format as `[-]HH:MM:SS.ffff`
    pub fn format_hms(&self) -> String {
        let sign = if self.ticks < 0 { "-" } else { "" };
        let abs = self.ticks.unsigned_abs();
        let per_second = TICKS_PER_SECOND as u64;
        let fraction = abs % per_second;
        let total_seconds = abs / per_second;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        format!(
            "{}{:02}:{:02}:{:02}.{:0width$}",
            sign,
            hours,
            minutes,
            seconds,
            fraction,
            width = FRACTION_DIGITS
        )
    }
}

fn parse_unit(text: &str, original: &str) -> Result<i64, DomainError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidFormat(format!(
            "'{}' is not a time value. Expected [-]HH:MM:SS[.ffff] or seconds",
            original
        )));
    }
    text.parse::<i64>()
        .map_err(|_| DomainError::InvalidFormat(format!("'{}' is out of range", original)))
}

fn parse_fraction(text: &str, original: &str) -> Result<i64, DomainError> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidFormat(format!(
            "invalid fractional seconds in '{}'",
            original
        )));
    }
    let mut ticks = 0i64;
    for position in 0..FRACTION_DIGITS {
        let digit = text.as_bytes().get(position).map_or(0, |b| (b - b'0') as i64);
        ticks = ticks * 10 + digit;
    }
    Ok(ticks)
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_hms())
    }
}

impl FromStr for TimeSpec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for TimeSpec {
    type Output = TimeSpec;

    fn add(self, rhs: TimeSpec) -> TimeSpec {
        TimeSpec::from_ticks(self.ticks.saturating_add(rhs.ticks))
    }
}

impl Sub for TimeSpec {
    type Output = TimeSpec;

    fn sub(self, rhs: TimeSpec) -> TimeSpec {
        TimeSpec::from_ticks(self.ticks.saturating_sub(rhs.ticks))
    }
}

impl Serialize for TimeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format_hms())
    }
}

impl<'de> Deserialize<'de> for TimeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        TimeSpec::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Optional start/stop/duration window applied to an input or the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trim {
    pub start: Option<TimeSpec>,
    pub stop: Option<TimeSpec>,
    pub duration: Option<TimeSpec>,
}

impl Trim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, start: TimeSpec) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_stop(mut self, stop: TimeSpec) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_duration(mut self, duration: TimeSpec) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.stop.is_none() && self.duration.is_none()
    }

    /// `-ss`, `-to` and `-t` tokens for whichever fields are set
    pub fn to_arguments(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(start) = self.start {
            args.push("-ss".to_string());
            args.push(start.format_hms());
        }
        if let Some(stop) = self.stop {
            args.push("-to".to_string());
            args.push(stop.format_hms());
        }
        if let Some(duration) = self.duration {
            args.push("-t".to_string());
            args.push(duration.format_hms());
        }
        args
    }
}

/// Kind of an elementary stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => f.write_str("video"),
            StreamKind::Audio => f.write_str("audio"),
            StreamKind::Subtitle => f.write_str("subtitle"),
        }
    }
}

/// Video stream information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    pub index: usize,
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: Option<f64>,
    pub duration: TimeSpec,
    pub start_time: TimeSpec,
    pub language: Option<String>,
}

/// Audio stream information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    pub index: usize,
    pub codec: String,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
    pub duration: TimeSpec,
    pub start_time: TimeSpec,
    pub language: Option<String>,
}

/// Subtitle stream information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleStreamInfo {
    pub index: usize,
    pub codec: String,
    pub duration: TimeSpec,
    pub start_time: TimeSpec,
    pub language: Option<String>,
    pub forced: bool,
}

/// A chapter marker found in a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterInfo {
    pub id: i64,
    pub start: TimeSpec,
    pub end: TimeSpec,
    pub title: Option<String>,
}

/// Analysis of one media file as reported by the probe collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAnalysis {
    pub path: PathBuf,
    pub format_name: String,
    /// Longest of the container duration and the primary streams
    pub duration: TimeSpec,
    pub size: Option<u64>,
    pub bit_rate: Option<u64>,
    pub video_streams: Vec<VideoStreamInfo>,
    pub audio_streams: Vec<AudioStreamInfo>,
    pub subtitle_streams: Vec<SubtitleStreamInfo>,
    pub chapters: Vec<ChapterInfo>,
}

impl MediaAnalysis {
    /// Empty analysis for a path with a known duration
    pub fn new(path: impl Into<PathBuf>, duration: TimeSpec) -> Self {
        Self {
            path: path.into(),
            format_name: String::new(),
            duration,
            size: None,
            bit_rate: None,
            video_streams: Vec::new(),
            audio_streams: Vec::new(),
            subtitle_streams: Vec::new(),
            chapters: Vec::new(),
        }
    }

    /// Source stream indices of every stream of `kind`, in probe order
    pub fn stream_indices(&self, kind: StreamKind) -> Vec<usize> {
        match kind {
            StreamKind::Video => self.video_streams.iter().map(|s| s.index).collect(),
            StreamKind::Audio => self.audio_streams.iter().map(|s| s.index).collect(),
            StreamKind::Subtitle => self.subtitle_streams.iter().map(|s| s.index).collect(),
        }
    }

    /// Get primary video stream (usually the first one)
    pub fn primary_video_stream(&self) -> Option<&VideoStreamInfo> {
        self.video_streams.first()
    }

    /// Get primary audio stream
    pub fn primary_audio_stream(&self) -> Option<&AudioStreamInfo> {
        self.audio_streams.first()
    }

    /// Get total number of streams
    pub fn total_streams(&self) -> usize {
        self.video_streams.len() + self.audio_streams.len() + self.subtitle_streams.len()
    }
}

/// Raw result of running the external process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutput {
    /// Exit status; -1 when the process never ran or was killed by a signal
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// Launch or I/O failure reported by the runner
    pub exception: Option<String>,
}

impl ProcessOutput {
    /// Output of a process that could not be started
    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self {
            exit_code: -1,
            exception: Some(message.into()),
            ..Self::default()
        }
    }
}
