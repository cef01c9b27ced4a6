//! Output file specification.

use std::path::{Path, PathBuf};

use crate::domain::model::{TimeSpec, Trim};

/// Containers that get `-movflags +faststart`
const FASTSTART_EXTENSIONS: &[&str] = &["m4v", "mov", "m4a", "mp4"];

/// Destination of a transcode and the output-side options
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    path: PathBuf,
    trim: Trim,
    size_limit: Option<u64>,
    title: Option<String>,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            trim: Trim::default(),
            size_limit: None,
            title: None,
        }
    }

    /// Output trim. When both are set the duration wins over the stop time.
    #[must_use]
    pub fn with_trim(mut self, trim: Trim) -> Self {
        self.trim = trim;
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: TimeSpec) -> Self {
        self.trim.start = Some(start);
        self
    }

    #[must_use]
    pub fn with_stop(mut self, stop: TimeSpec) -> Self {
        self.trim.stop = Some(stop);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: TimeSpec) -> Self {
        self.trim.duration = Some(duration);
        self
    }

    /// Stop writing once the file reaches `bytes`
    #[must_use]
    pub fn with_size_limit(mut self, bytes: u64) -> Self {
        self.size_limit = Some(bytes);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn trim(&self) -> &Trim {
        &self.trim
    }

    /// Flags implied by the container, judged from the extension alone
    pub fn container_flags(&self) -> Vec<String> {
        let extension = self
            .path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match extension {
            Some(ext) if FASTSTART_EXTENSIONS.contains(&ext.as_str()) => {
                vec!["-movflags".to_string(), "+faststart".to_string()]
            }
            _ => Vec::new(),
        }
    }

    /// Trim, size limit, title and container flags, then the path
    pub fn to_arguments(&self) -> Vec<String> {
        let mut args = self.trim.to_arguments();
        if let Some(bytes) = self.size_limit {
            args.push("-fs".to_string());
            args.push(bytes.to_string());
        }
        if let Some(title) = &self.title {
            args.push("-metadata".to_string());
            args.push(format!("title={}", title));
        }
        args.extend(self.container_flags());
        args.push(self.path.to_string_lossy().into_owned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faststart_by_extension() {
        assert_eq!(
            OutputFile::new("clip.MP4").container_flags(),
            vec!["-movflags", "+faststart"]
        );
        assert_eq!(OutputFile::new("clip.mov").container_flags().len(), 2);
        assert!(OutputFile::new("clip.mkv").container_flags().is_empty());
        assert!(OutputFile::new("noext").container_flags().is_empty());
    }

    #[test]
    fn test_output_arguments_end_with_path() {
        let output = OutputFile::new("out.mp4")
            .with_start(TimeSpec::from_seconds(10.0))
            .with_duration(TimeSpec::from_seconds(30.0))
            .with_size_limit(1_000_000)
            .with_title("Holiday");
        assert_eq!(
            output.to_arguments(),
            vec![
                "-ss",
                "00:00:10.0000",
                "-t",
                "00:00:30.0000",
                "-fs",
                "1000000",
                "-metadata",
                "title=Holiday",
                "-movflags",
                "+faststart",
                "out.mp4",
            ]
        );
    }
}
