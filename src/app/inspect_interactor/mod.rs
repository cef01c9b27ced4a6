// Inspect interactor - Orchestrates media file inspection use case

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Rendering of an inspection summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InspectFormat {
    #[default]
    Text,
    Json,
}

/// Request for media file inspection
#[derive(Debug, Clone)]
pub struct InspectRequest {
    pub input_path: PathBuf,
    pub format: InspectFormat,
}

impl InspectRequest {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            format: InspectFormat::Text,
        }
    }

    pub fn with_format(mut self, format: InspectFormat) -> Self {
        self.format = format;
        self
    }
}

/// Response from media file inspection
#[derive(Debug, Clone)]
pub struct InspectResponse {
    pub analysis: MediaAnalysis,
    pub summary: String,
}

/// Interactor for media file inspection use case
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    /// Probe a file without rendering anything
    pub async fn analyse(&self, path: &Path) -> Result<MediaAnalysis, DomainError> {
        if !path.exists() {
            return Err(DomainError::FileNotFound(path.display().to_string()));
        }
        let analysis = self.probe_port.analyse(path).await?;
        info!(
            "Media file probed successfully: {} streams, {}",
            analysis.total_streams(),
            analysis.duration
        );
        Ok(analysis)
    }

    /// Execute media file inspection
    pub async fn execute(&self, request: InspectRequest) -> Result<InspectResponse, DomainError> {
        let analysis = self.analyse(&request.input_path).await?;
        let summary = match request.format {
            InspectFormat::Json => format_as_json(&analysis)?,
            InspectFormat::Text => format_as_text(&analysis),
        };
        Ok(InspectResponse { analysis, summary })
    }
}

fn format_as_json(analysis: &MediaAnalysis) -> Result<String, DomainError> {
    serde_json::to_string_pretty(analysis)
        .map_err(|e| DomainError::ProcessingError(format!("JSON serialization failed: {}", e)))
}

/// Human-readable summary
pub fn format_as_text(analysis: &MediaAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Media File Information:");
    let _ = writeln!(out, "  File: {}", analysis.path.display());
    let _ = writeln!(out, "  Container: {}", analysis.format_name);
    let _ = writeln!(out, "  Duration: {}", analysis.duration);
    if let Some(size) = analysis.size {
        let _ = writeln!(out, "  File Size: {:.2} MB", size as f64 / 1_048_576.0);
    }
    let _ = writeln!(out, "  Total Streams: {}", analysis.total_streams());

    if !analysis.video_streams.is_empty() {
        let _ = writeln!(out, "\nVideo Streams ({}):", analysis.video_streams.len());
        for stream in &analysis.video_streams {
            let fps = stream.frame_rate.map(|r| format!(" @ {:.2}fps", r)).unwrap_or_default();
            let _ = writeln!(
                out,
                "  Stream #{}: {}x{}{}, {}",
                stream.index, stream.width, stream.height, fps, stream.codec
            );
        }
    }

    if !analysis.audio_streams.is_empty() {
        let _ = writeln!(out, "\nAudio Streams ({}):", analysis.audio_streams.len());
        for stream in &analysis.audio_streams {
            let _ = writeln!(
                out,
                "  Stream #{}: {} channels, {} Hz, {} ({})",
                stream.index,
                stream.channels.unwrap_or(0),
                stream.sample_rate.unwrap_or(0),
                stream.codec,
                stream.language.as_deref().unwrap_or("und")
            );
        }
    }

    if !analysis.subtitle_streams.is_empty() {
        let _ = writeln!(out, "\nSubtitle Streams ({}):", analysis.subtitle_streams.len());
        for stream in &analysis.subtitle_streams {
            let forced = if stream.forced { ", forced" } else { "" };
            let _ = writeln!(
                out,
                "  Stream #{}: {} ({}){}",
                stream.index,
                stream.codec,
                stream.language.as_deref().unwrap_or("und"),
                forced
            );
        }
    }

    if !analysis.chapters.is_empty() {
        let _ = writeln!(out, "\nChapters ({}):", analysis.chapters.len());
        for chapter in &analysis.chapters {
            let _ = writeln!(
                out,
                "  {} - {} {}",
                chapter.start,
                chapter.end,
                chapter.title.as_deref().unwrap_or("")
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_summary_lists_streams() {
        let mut analysis = MediaAnalysis::new("movie.mkv", TimeSpec::from_seconds(90.0));
        analysis.format_name = "matroska,webm".to_string();
        analysis.audio_streams.push(AudioStreamInfo {
            index: 1,
            codec: "opus".to_string(),
            sample_rate: Some(48000),
            channels: Some(2),
            duration: TimeSpec::from_seconds(90.0),
            start_time: TimeSpec::ZERO,
            language: Some("eng".to_string()),
        });

        let text = format_as_text(&analysis);
        assert!(text.contains("Container: matroska,webm"));
        assert!(text.contains("Duration: 00:01:30.0000"));
        assert!(text.contains("Stream #1: 2 channels, 48000 Hz, opus (eng)"));
        assert!(!text.contains("Video Streams"));
    }
}
