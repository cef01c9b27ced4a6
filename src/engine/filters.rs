//! Filter capabilities. Each filter renders to one segment of a
//! comma-joined filter chain.

use std::fmt;

use crate::domain::model::StreamKind;

/// Standard output heights for [`Filter::scale_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleResolution {
    Uhd7680x4320 = 4320,
    Uhd3840x2160 = 2160,
    Hd1920x1080 = 1080,
    Hd1280x720 = 720,
    Sd720x480 = 480,
}

impl ScaleResolution {
    pub fn from_height(height: u32) -> Option<Self> {
        match height {
            4320 => Some(ScaleResolution::Uhd7680x4320),
            2160 => Some(ScaleResolution::Uhd3840x2160),
            1080 => Some(ScaleResolution::Hd1920x1080),
            720 => Some(ScaleResolution::Hd1280x720),
            480 => Some(ScaleResolution::Sd720x480),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Scale { width: i32, height: i32 },
    /// Bottom-right corner overlay, `padding` pixels from both edges
    Overlay { padding: u32 },
    Yadif,
    Bwdif,
    Volume(f64),
    /// Filter expression passed through untouched
    Raw(String),
}

impl Filter {
    pub fn scale(width: i32, height: i32) -> Self {
        Filter::Scale { width, height }
    }

    /// Scale to a standard height. Width -2 keeps the aspect ratio while
    /// staying divisible by two, which several encoders require.
    pub fn scale_to(resolution: ScaleResolution) -> Self {
        Filter::Scale {
            width: -2,
            height: resolution as i32,
        }
    }

    pub fn overlay() -> Self {
        Filter::Overlay { padding: 10 }
    }

    pub fn overlay_with_padding(padding: u32) -> Self {
        Filter::Overlay { padding }
    }

    pub fn raw(expression: impl Into<String>) -> Self {
        Filter::Raw(expression.into())
    }

    /// Stream kind the filter operates on, `None` when unknown
    pub fn kind(&self) -> Option<StreamKind> {
        match self {
            Filter::Scale { .. } | Filter::Overlay { .. } | Filter::Yadif | Filter::Bwdif => {
                Some(StreamKind::Video)
            }
            Filter::Volume(_) => Some(StreamKind::Audio),
            Filter::Raw(_) => None,
        }
    }

    /// The chain segment for this filter
    pub fn segment(&self) -> String {
        match self {
            Filter::Scale { width, height } => format!("scale={}:{}", width, height),
            Filter::Overlay { padding } => format!(
                "overlay=main_w-overlay_w-{p}:main_h-overlay_h-{p}",
                p = padding
            ),
            Filter::Yadif => "yadif".to_string(),
            Filter::Bwdif => "bwdif".to_string(),
            Filter::Volume(factor) => format!("volume={}", factor),
            Filter::Raw(expression) => expression.clone(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segment())
    }
}

/// Joins segments into one chain
pub fn join_chain(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(Filter::segment)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_segments() {
        assert_eq!(Filter::scale(1280, 720).segment(), "scale=1280:720");
        assert_eq!(
            Filter::scale_to(ScaleResolution::Hd1920x1080).segment(),
            "scale=-2:1080"
        );
        assert_eq!(ScaleResolution::from_height(2160), Some(ScaleResolution::Uhd3840x2160));
        assert_eq!(ScaleResolution::from_height(1000), None);
    }

    #[test]
    fn test_overlay_segment() {
        assert_eq!(
            Filter::overlay().segment(),
            "overlay=main_w-overlay_w-10:main_h-overlay_h-10"
        );
        assert_eq!(
            Filter::overlay_with_padding(0).segment(),
            "overlay=main_w-overlay_w-0:main_h-overlay_h-0"
        );
    }

    #[test]
    fn test_chain_join() {
        let chain = join_chain(&[Filter::Yadif, Filter::scale_to(ScaleResolution::Hd1280x720)]);
        assert_eq!(chain, "yadif,scale=-2:720");
        assert_eq!(Filter::Volume(0.5).segment(), "volume=0.5");
        assert_eq!(Filter::Volume(0.5).kind(), Some(StreamKind::Audio));
    }
}
