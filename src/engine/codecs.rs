//! Codec capabilities.
//!
//! Every codec turns its settings into the `-c:N` token pair followed by the
//! encoder-specific fragment, all addressed to output stream `N`. Settings
//! outside an encoder's accepted range are dropped with a warning so the
//! encoder default applies.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use tracing::warn;

use crate::domain::errors::DomainError;
use crate::domain::model::StreamKind;

/// Codec selected for one output stream
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Codec {
    /// Stream copy, valid for every stream kind
    #[default]
    Copy,
    Video(VideoCodec),
    Audio(AudioCodec),
    Subtitle(SubtitleCodec),
}

impl Codec {
    /// Encoder name as ffmpeg knows it
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Copy => "copy",
            Codec::Video(VideoCodec::Libx264(_)) => "libx264",
            Codec::Video(VideoCodec::LibSvtAv1(_)) => "libsvtav1",
            Codec::Audio(AudioCodec::Aac(_)) => "aac",
            Codec::Audio(AudioCodec::Ac3(_)) => "ac3",
            Codec::Audio(AudioCodec::Libopus(_)) => "libopus",
            Codec::Subtitle(SubtitleCodec::MovText) => "mov_text",
            Codec::Subtitle(SubtitleCodec::Srt) => "srt",
            Codec::Subtitle(SubtitleCodec::Ass) => "ass",
        }
    }

    /// Stream kind the encoder accepts, `None` for copy
    pub fn kind(&self) -> Option<StreamKind> {
        match self {
            Codec::Copy => None,
            Codec::Video(_) => Some(StreamKind::Video),
            Codec::Audio(_) => Some(StreamKind::Audio),
            Codec::Subtitle(_) => Some(StreamKind::Subtitle),
        }
    }

    /// Tokens selecting this codec for output stream `slot`
    pub fn to_arguments(&self, slot: usize) -> Vec<String> {
        let mut args = vec![format!("-c:{}", slot), self.name().to_string()];
        let spec = format!(":{}", slot);
        match self {
            Codec::Copy | Codec::Subtitle(_) => {}
            Codec::Video(VideoCodec::Libx264(codec)) => codec.push_arguments(&spec, &mut args),
            Codec::Video(VideoCodec::LibSvtAv1(codec)) => codec.push_arguments(&spec, &mut args),
            Codec::Audio(AudioCodec::Aac(settings))
            | Codec::Audio(AudioCodec::Ac3(settings))
            | Codec::Audio(AudioCodec::Libopus(settings)) => {
                settings.push_arguments(&spec, &mut args)
            }
        }
        args
    }

    /// Parse a codec name as typed on the command line
    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        match name.to_ascii_lowercase().as_str() {
            "copy" => Ok(Codec::Copy),
            "libx264" | "h264" | "x264" => Ok(Libx264::new().into()),
            "libsvtav1" | "av1" | "svtav1" => Ok(LibSvtAv1::new().into()),
            "aac" => Ok(AudioCodec::aac().into()),
            "ac3" => Ok(AudioCodec::ac3().into()),
            "libopus" | "opus" => Ok(AudioCodec::libopus().into()),
            "mov_text" => Ok(Codec::Subtitle(SubtitleCodec::MovText)),
            "srt" | "subrip" => Ok(Codec::Subtitle(SubtitleCodec::Srt)),
            "ass" => Ok(Codec::Subtitle(SubtitleCodec::Ass)),
            other => Err(DomainError::BadArgs(format!("unknown codec '{}'", other))),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn checked<T>(setting: &str, value: T, range: RangeInclusive<T>) -> Option<T>
where
    T: PartialOrd + fmt::Display + Copy,
{
    if range.contains(&value) {
        Some(value)
    } else {
        warn!(
            "Invalid {} value '{}' (accepted {}..={}). Using encoder default instead.",
            setting,
            value,
            range.start(),
            range.end()
        );
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VideoCodec {
    Libx264(Libx264),
    LibSvtAv1(LibSvtAv1),
}

/// x264 speed/quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum X264Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    Medium,
    Slow,
    Slower,
    Veryslow,
    Placebo,
}

impl X264Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            X264Preset::Ultrafast => "ultrafast",
            X264Preset::Superfast => "superfast",
            X264Preset::Veryfast => "veryfast",
            X264Preset::Faster => "faster",
            X264Preset::Fast => "fast",
            X264Preset::Medium => "medium",
            X264Preset::Slow => "slow",
            X264Preset::Slower => "slower",
            X264Preset::Veryslow => "veryslow",
            X264Preset::Placebo => "placebo",
        }
    }
}

impl FromStr for X264Preset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ultrafast" => Ok(X264Preset::Ultrafast),
            "superfast" => Ok(X264Preset::Superfast),
            "veryfast" => Ok(X264Preset::Veryfast),
            "faster" => Ok(X264Preset::Faster),
            "fast" => Ok(X264Preset::Fast),
            "medium" => Ok(X264Preset::Medium),
            "slow" => Ok(X264Preset::Slow),
            "slower" => Ok(X264Preset::Slower),
            "veryslow" => Ok(X264Preset::Veryslow),
            "placebo" => Ok(X264Preset::Placebo),
            other => Err(DomainError::BadArgs(format!("unknown x264 preset '{}'", other))),
        }
    }
}

/// H.264 through libx264
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Libx264 {
    crf: Option<u8>,
    preset: Option<X264Preset>,
}

impl Libx264 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constant rate factor, 0 (lossless) to 51
    #[must_use]
    pub fn with_crf(mut self, crf: i32) -> Self {
        self.crf = checked("libx264 crf", crf, 0..=51).map(|v| v as u8);
        self
    }

    #[must_use]
    pub fn with_preset(mut self, preset: X264Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    fn push_arguments(&self, spec: &str, args: &mut Vec<String>) {
        if let Some(preset) = self.preset {
            args.push(format!("-preset{}", spec));
            args.push(preset.as_str().to_string());
        }
        if let Some(crf) = self.crf {
            args.push(format!("-crf{}", spec));
            args.push(crf.to_string());
        }
    }
}

impl From<Libx264> for Codec {
    fn from(codec: Libx264) -> Self {
        Codec::Video(VideoCodec::Libx264(codec))
    }
}

/// AV1 through SVT-AV1
#[derive(Debug, Clone, PartialEq)]
pub struct LibSvtAv1 {
    crf: Option<u8>,
    preset: Option<u8>,
    tune: Option<bool>,
    film_grain: Option<u8>,
    film_grain_denoise: bool,
    fast_decode: Option<u8>,
}

impl Default for LibSvtAv1 {
    fn default() -> Self {
        Self {
            crf: None,
            preset: None,
            tune: None,
            film_grain: None,
            film_grain_denoise: true,
            fast_decode: None,
        }
    }
}

impl LibSvtAv1 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constant rate factor, 0 to 63
    #[must_use]
    pub fn with_crf(mut self, crf: i32) -> Self {
        self.crf = checked("libsvtav1 crf", crf, 0..=63).map(|v| v as u8);
        self
    }

    /// Encoder preset, 0 (slowest) to 8
    #[must_use]
    pub fn with_preset(mut self, preset: i32) -> Self {
        self.preset = checked("libsvtav1 preset", preset, 0..=8).map(|v| v as u8);
        self
    }

    /// `true` tunes for subjective quality, `false` for PSNR
    #[must_use]
    pub fn with_tune(mut self, visual_quality: bool) -> Self {
        self.tune = Some(visual_quality);
        self
    }

    /// Film grain synthesis level, 1 to 50
    #[must_use]
    pub fn with_film_grain(mut self, level: i32, denoise: bool) -> Self {
        self.film_grain = checked("libsvtav1 film-grain", level, 1..=50).map(|v| v as u8);
        self.film_grain_denoise = denoise;
        self
    }

    /// Decoder speed-up level, 1 to 3
    #[must_use]
    pub fn with_fast_decode(mut self, level: i32) -> Self {
        self.fast_decode = checked("libsvtav1 fast-decode", level, 1..=3).map(|v| v as u8);
        self
    }

    fn push_arguments(&self, spec: &str, args: &mut Vec<String>) {
        if let Some(preset) = self.preset {
            args.push(format!("-preset{}", spec));
            args.push(preset.to_string());
        }
        if let Some(crf) = self.crf {
            args.push(format!("-crf{}", spec));
            args.push(crf.to_string());
        }

        let mut params = Vec::new();
        if let Some(tune) = self.tune {
            params.push(format!("tune={}", u8::from(tune)));
        }
        if let Some(level) = self.film_grain {
            params.push(format!("film-grain={}", level));
            params.push(format!("film-grain-denoise={}", u8::from(self.film_grain_denoise)));
        }
        if let Some(level) = self.fast_decode {
            params.push(format!("fast-decode={}", level));
        }
        if !params.is_empty() {
            args.push(format!("-svtav1-params{}", spec));
            args.push(params.join(":"));
        }
    }
}

impl From<LibSvtAv1> for Codec {
    fn from(codec: LibSvtAv1) -> Self {
        Codec::Video(VideoCodec::LibSvtAv1(codec))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCodec {
    Aac(AudioBitrate),
    Ac3(AudioBitrate),
    Libopus(AudioBitrate),
}

impl AudioCodec {
    pub fn aac() -> Self {
        AudioCodec::Aac(AudioBitrate::new(16..=512))
    }

    pub fn ac3() -> Self {
        AudioCodec::Ac3(AudioBitrate::new(32..=640))
    }

    pub fn libopus() -> Self {
        AudioCodec::Libopus(AudioBitrate::new(6..=510))
    }

    /// Target bitrate in kbit/s, checked against the encoder's range
    #[must_use]
    pub fn with_bitrate(self, kbps: u32) -> Self {
        match self {
            AudioCodec::Aac(b) => AudioCodec::Aac(b.with_kbps("aac", kbps)),
            AudioCodec::Ac3(b) => AudioCodec::Ac3(b.with_kbps("ac3", kbps)),
            AudioCodec::Libopus(b) => AudioCodec::Libopus(b.with_kbps("libopus", kbps)),
        }
    }
}

impl From<AudioCodec> for Codec {
    fn from(codec: AudioCodec) -> Self {
        Codec::Audio(codec)
    }
}

/// Bitrate setting shared by the audio encoders
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBitrate {
    kbps: Option<u32>,
    range: RangeInclusive<u32>,
}

impl AudioBitrate {
    fn new(range: RangeInclusive<u32>) -> Self {
        Self { kbps: None, range }
    }

    fn with_kbps(mut self, encoder: &str, kbps: u32) -> Self {
        self.kbps = checked(&format!("{} bitrate", encoder), kbps, self.range.clone());
        self
    }

    fn push_arguments(&self, spec: &str, args: &mut Vec<String>) {
        if let Some(kbps) = self.kbps {
            args.push(format!("-b{}", spec));
            args.push(format!("{}k", kbps));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleCodec {
    MovText,
    Srt,
    Ass,
}

impl From<SubtitleCodec> for Codec {
    fn from(codec: SubtitleCodec) -> Self {
        Codec::Subtitle(codec)
    }
}
