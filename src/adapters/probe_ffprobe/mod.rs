//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe -print_format json` and maps the document onto `MediaAnalysis`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    program: PathBuf,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn arguments(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            "-show_streams".to_string(),
            "-show_chapters".to_string(),
            path.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn analyse(&self, path: &Path) -> Result<MediaAnalysis, DomainError> {
        if !path.exists() {
            return Err(DomainError::FileNotFound(path.display().to_string()));
        }

        debug!("Probing {}", path.display());
        let output = tokio::process::Command::new(&self.program)
            .args(Self::arguments(path))
            .output()
            .await
            .map_err(|e| {
                DomainError::ProbeFailed(format!("failed to start {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::ProbeFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        parse_probe_document(path, &output.stdout)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProbeDocument {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
    #[serde(default)]
    chapters: Vec<ProbeChapter>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
    duration: Option<String>,
    start_time: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    disposition: HashMap<String, i64>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeChapter {
    id: i64,
    start_time: Option<String>,
    end_time: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

fn seconds(value: Option<&String>) -> TimeSpec {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|s| s.is_finite())
        .map(TimeSpec::from_seconds)
        .unwrap_or(TimeSpec::ZERO)
}

/// `30000/1001` style rational, or a plain number
fn frame_rate(value: Option<&String>) -> Option<f64> {
    let value = value?;
    let rate = match value.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num.parse::<f64>().ok()? / den
        }
        None => value.parse().ok()?,
    };
    (rate > 0.0).then_some(rate)
}

/// Map an ffprobe JSON document onto `MediaAnalysis`
pub fn parse_probe_document(path: &Path, json: &[u8]) -> Result<MediaAnalysis, DomainError> {
    let document: ProbeDocument = serde_json::from_slice(json)
        .map_err(|e| DomainError::InvalidFormat(format!("ffprobe output: {}", e)))?;

    let format = document.format.unwrap_or_default();
    let mut analysis = MediaAnalysis::new(path, seconds(format.duration.as_ref()));
    analysis.format_name = format.format_name.unwrap_or_default();
    analysis.size = format.size.and_then(|s| s.parse().ok());
    analysis.bit_rate = format.bit_rate.and_then(|s| s.parse().ok());

    for stream in document.streams {
        let codec = stream.codec_name.clone().unwrap_or_default();
        let language = stream.tags.get("language").cloned();
        let duration = seconds(stream.duration.as_ref());
        let start_time = seconds(stream.start_time.as_ref());

        match stream.codec_type.as_deref() {
            Some("video") => analysis.video_streams.push(VideoStreamInfo {
                index: stream.index,
                codec,
                width: stream.width.unwrap_or(0),
                height: stream.height.unwrap_or(0),
                frame_rate: frame_rate(stream.avg_frame_rate.as_ref())
                    .or_else(|| frame_rate(stream.r_frame_rate.as_ref())),
                duration,
                start_time,
                language,
            }),
            Some("audio") => analysis.audio_streams.push(AudioStreamInfo {
                index: stream.index,
                codec,
                sample_rate: stream.sample_rate.as_ref().and_then(|s| s.parse().ok()),
                channels: stream.channels,
                duration,
                start_time,
                language,
            }),
            Some("subtitle") => analysis.subtitle_streams.push(SubtitleStreamInfo {
                index: stream.index,
                codec,
                duration,
                start_time,
                language,
                forced: stream.disposition.get("forced").copied().unwrap_or(0) != 0,
            }),
            other => debug!("Skipping stream {} of type {:?}", stream.index, other),
        }
    }

    for chapter in document.chapters {
        analysis.chapters.push(ChapterInfo {
            id: chapter.id,
            start: seconds(chapter.start_time.as_ref()),
            end: seconds(chapter.end_time.as_ref()),
            title: chapter.tags.get("title").cloned(),
        });
    }

    // Containers sometimes report no duration of their own
    let primary = [
        analysis.primary_video_stream().map(|s| s.duration),
        analysis.primary_audio_stream().map(|s| s.duration),
    ];
    for duration in primary.into_iter().flatten() {
        if duration > analysis.duration {
            analysis.duration = duration;
        }
    }
    if analysis.duration.is_zero() {
        warn!("No duration reported for {}", path.display());
    }

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "index": 0, "codec_type": "video", "codec_name": "h264",
                "width": 1920, "height": 1080,
                "avg_frame_rate": "30000/1001", "r_frame_rate": "30000/1001",
                "duration": "120.120000", "start_time": "0.000000",
                "tags": {"language": "und"}
            },
            {
                "index": 1, "codec_type": "audio", "codec_name": "aac",
                "sample_rate": "48000", "channels": 2,
                "duration": "121.500000", "start_time": "0.000000",
                "tags": {"language": "eng"}
            },
            {
                "index": 2, "codec_type": "subtitle", "codec_name": "mov_text",
                "disposition": {"default": 0, "forced": 1},
                "tags": {"language": "fre"}
            },
            { "index": 3, "codec_type": "data", "codec_name": "bin_data" }
        ],
        "chapters": [
            {"id": 0, "start_time": "0.000000", "end_time": "60.000000", "tags": {"title": "Opening"}},
            {"id": 1, "start_time": "60.000000", "end_time": "121.500000"}
        ],
        "format": {
            "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
            "duration": "120.500000", "size": "1048576", "bit_rate": "69905"
        }
    }"#;

    #[test]
    fn test_parse_probe_document() {
        let analysis = parse_probe_document(Path::new("movie.mp4"), SAMPLE.as_bytes()).unwrap();

        assert_eq!(analysis.format_name, "mov,mp4,m4a,3gp,3g2,mj2");
        assert_eq!(analysis.size, Some(1048576));
        assert_eq!(analysis.bit_rate, Some(69905));
        assert_eq!(analysis.video_streams.len(), 1);
        assert_eq!(analysis.audio_streams.len(), 1);
        assert_eq!(analysis.subtitle_streams.len(), 1);
        assert_eq!(analysis.total_streams(), 3);

        let video = &analysis.video_streams[0];
        assert_eq!((video.width, video.height), (1920, 1080));
        assert!((video.frame_rate.unwrap() - 29.97).abs() < 0.01);

        let audio = &analysis.audio_streams[0];
        assert_eq!(audio.sample_rate, Some(48000));
        assert_eq!(audio.language.as_deref(), Some("eng"));

        assert!(analysis.subtitle_streams[0].forced);
        assert_eq!(analysis.chapters[0].title.as_deref(), Some("Opening"));
        assert_eq!(analysis.chapters[1].title, None);
    }

    #[test]
    fn test_duration_is_longest_of_format_and_primary_streams() {
        let analysis = parse_probe_document(Path::new("movie.mp4"), SAMPLE.as_bytes()).unwrap();
        assert_eq!(analysis.duration, TimeSpec::from_seconds(121.5));
    }

    #[test]
    fn test_missing_sections_default() {
        let analysis = parse_probe_document(Path::new("empty.mkv"), b"{}").unwrap();
        assert!(analysis.duration.is_zero());
        assert_eq!(analysis.total_streams(), 0);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = parse_probe_document(Path::new("x.mp4"), b"not json").unwrap_err();
        assert!(matches!(err, DomainError::InvalidFormat(_)));
    }

    #[test]
    fn test_frame_rate_parsing() {
        assert_eq!(frame_rate(Some(&"25/1".to_string())), Some(25.0));
        assert_eq!(frame_rate(Some(&"0/0".to_string())), None);
        assert_eq!(frame_rate(Some(&"24".to_string())), Some(24.0));
        assert_eq!(frame_rate(None), None);
    }

    #[tokio::test]
    async fn test_analyse_missing_file() {
        let adapter = FFprobeAdapter::new("ffprobe");
        let err = adapter.analyse(Path::new("/no/such/file.mp4")).await.unwrap_err();
        assert!(matches!(err, DomainError::FileNotFound(_)));
    }
}
