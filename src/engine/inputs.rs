//! Input sources and the registry that gives them stable indices.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaAnalysis, TimeSpec, Trim};
use crate::domain::rules::InputExtent;

const MANIFEST_FILE_NAME: &str = "FileList.txt";

/// A media file read from disk
#[derive(Debug, Clone)]
pub struct FileInput {
    path: PathBuf,
    length: TimeSpec,
    trim: Trim,
}

impl FileInput {
    pub fn new(path: impl Into<PathBuf>, length: TimeSpec) -> Self {
        Self {
            path: path.into(),
            length,
            trim: Trim::default(),
        }
    }

    pub fn from_analysis(analysis: &MediaAnalysis) -> Self {
        Self::new(analysis.path.clone(), analysis.duration)
    }

    /// Seek/stop/duration applied before `-i`. Seeking lands on the closest
    /// seek point before the start; a transcode discards the extra frames,
    /// a stream copy keeps them.
    #[must_use]
    pub fn with_trim(mut self, trim: Trim) -> Self {
        self.trim = trim;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn length(&self) -> TimeSpec {
        self.length
    }

    pub fn trim(&self) -> &Trim {
        &self.trim
    }
}

// The analysed length is not part of the identity.
impl PartialEq for FileInput {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.trim == other.trim
    }
}

/// Silent audio generated by the `anullsrc` lavfi source
#[derive(Debug, Clone, PartialEq)]
pub struct NullAudioInput {
    duration: TimeSpec,
}

impl NullAudioInput {
    pub fn new(duration: TimeSpec) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> TimeSpec {
        self.duration
    }
}

/// One file line of a concat manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatEntry {
    pub path: PathBuf,
    pub length: TimeSpec,
    pub duration: Option<TimeSpec>,
    pub inpoint: Option<TimeSpec>,
    pub outpoint: Option<TimeSpec>,
}

impl ConcatEntry {
    pub fn new(path: impl Into<PathBuf>, length: TimeSpec) -> Self {
        Self {
            path: path.into(),
            length,
            duration: None,
            inpoint: None,
            outpoint: None,
        }
    }

    pub fn from_analysis(analysis: &MediaAnalysis) -> Self {
        Self::new(analysis.path.clone(), analysis.duration)
    }

    #[must_use]
    pub fn with_duration(mut self, duration: TimeSpec) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn with_inpoint(mut self, inpoint: TimeSpec) -> Self {
        self.inpoint = Some(inpoint);
        self
    }

    #[must_use]
    pub fn with_outpoint(mut self, outpoint: TimeSpec) -> Self {
        self.outpoint = Some(outpoint);
        self
    }

    /// Time this entry adds to the joined output
    pub fn effective_length(&self) -> TimeSpec {
        if let Some(duration) = self.duration {
            return duration;
        }
        let end = self.outpoint.unwrap_or(self.length);
        (end - self.inpoint.unwrap_or(TimeSpec::ZERO)).clamp_non_negative()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ManifestLine {
    File(ConcatEntry),
    Chapter {
        id: String,
        start: TimeSpec,
        end: TimeSpec,
    },
}

/// Files joined end to end through the concat demuxer.
///
/// The manifest only exists between [`ConcatInput::prepare`] and
/// [`ConcatInput::dispose`].
#[derive(Debug, Default)]
pub struct ConcatInput {
    lines: Vec<ManifestLine>,
    trim: Trim,
    manifest: Option<TempDir>,
}

impl ConcatInput {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entry(mut self, entry: ConcatEntry) -> Self {
        self.lines.push(ManifestLine::File(entry));
        self
    }

    #[must_use]
    pub fn with_chapter(mut self, id: impl Into<String>, start: TimeSpec, end: TimeSpec) -> Self {
        self.lines.push(ManifestLine::Chapter {
            id: id.into(),
            start,
            end,
        });
        self
    }

    #[must_use]
    pub fn with_trim(mut self, trim: Trim) -> Self {
        self.trim = trim;
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConcatEntry> {
        self.lines.iter().filter_map(|line| match line {
            ManifestLine::File(entry) => Some(entry),
            ManifestLine::Chapter { .. } => None,
        })
    }

    /// Sum of the entries' effective lengths
    pub fn length(&self) -> TimeSpec {
        self.entries()
            .fold(TimeSpec::ZERO, |total, entry| total + entry.effective_length())
    }

    pub fn trim(&self) -> &Trim {
        &self.trim
    }

    /// Path of the written manifest, if prepared
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.manifest
            .as_ref()
            .map(|dir| dir.path().join(MANIFEST_FILE_NAME))
    }

    /// Manifest text in concat demuxer syntax
    pub fn manifest_contents(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                ManifestLine::File(entry) => {
                    out.push_str(&format!("file '{}'\n", quote_manifest_path(&entry.path)));
                    if let Some(duration) = entry.duration {
                        out.push_str(&format!("duration {}\n", duration));
                    }
                    if let Some(inpoint) = entry.inpoint {
                        out.push_str(&format!("inpoint {}\n", inpoint));
                    }
                    if let Some(outpoint) = entry.outpoint {
                        out.push_str(&format!("outpoint {}\n", outpoint));
                    }
                }
                ManifestLine::Chapter { id, start, end } => {
                    out.push_str(&format!("chapter {} {} {}\n", id, start, end));
                }
            }
        }
        out
    }

    /// Write the manifest into a fresh temporary directory. Calling it again
    /// while prepared does nothing.
    pub fn prepare(&mut self) -> Result<(), DomainError> {
        if self.manifest.is_some() {
            return Ok(());
        }
        let dir = tempfile::Builder::new()
            .prefix("ffwrap-concat-")
            .tempdir()
            .map_err(|e| DomainError::PrepareFailed(format!("temporary directory: {}", e)))?;
        let path = dir.path().join(MANIFEST_FILE_NAME);
        fs::write(&path, self.manifest_contents())
            .map_err(|e| DomainError::PrepareFailed(format!("{}: {}", path.display(), e)))?;
        debug!("Wrote concat manifest {}", path.display());
        self.manifest = Some(dir);
        Ok(())
    }

    /// Remove the manifest directory. Safe to call any number of times;
    /// removal failures are logged and otherwise ignored.
    pub fn dispose(&mut self) {
        if let Some(dir) = self.manifest.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!("Failed to remove concat manifest {}: {}", path.display(), e);
            }
        }
    }
}

// Identity is the configuration, not whether a manifest is on disk.
impl PartialEq for ConcatInput {
    fn eq(&self, other: &Self) -> bool {
        self.lines == other.lines && self.trim == other.trim
    }
}

/// ffmpeg resolves relative manifest entries against the manifest's own
/// directory, so entries are written absolute.
fn quote_manifest_path(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute.to_string_lossy().replace('\'', "'\\''")
}

/// Anything that becomes one `-i` block
#[derive(Debug, PartialEq)]
pub enum InputSource {
    File(FileInput),
    NullAudio(NullAudioInput),
    Concat(ConcatInput),
}

impl InputSource {
    /// Materialize temporary resources right before execution
    pub fn prepare(&mut self) -> Result<(), DomainError> {
        match self {
            InputSource::Concat(concat) => concat.prepare(),
            InputSource::File(_) | InputSource::NullAudio(_) => Ok(()),
        }
    }

    /// Input-side tokens: trims first, then the `-i` pair
    pub fn to_arguments(&self) -> Result<Vec<String>, DomainError> {
        let args = match self {
            InputSource::File(file) => {
                let mut args = file.trim.to_arguments();
                args.push("-i".to_string());
                args.push(file.path.to_string_lossy().into_owned());
                args
            }
            InputSource::NullAudio(null) => vec![
                "-f".to_string(),
                "lavfi".to_string(),
                "-t".to_string(),
                null.duration.format_hms(),
                "-i".to_string(),
                "anullsrc".to_string(),
            ],
            InputSource::Concat(concat) => {
                let manifest = concat.manifest_path().ok_or_else(|| {
                    DomainError::NotPrepared("concat manifest has not been written".to_string())
                })?;
                let mut args = concat.trim.to_arguments();
                args.extend(
                    ["-f", "concat", "-safe", "0", "-i"]
                        .iter()
                        .map(|s| s.to_string()),
                );
                args.push(manifest.to_string_lossy().into_owned());
                args
            }
        };
        Ok(args)
    }

    /// Release temporary resources; never fails
    pub fn dispose(&mut self) {
        if let InputSource::Concat(concat) = self {
            concat.dispose();
        }
    }

    /// Trim and full length, as seen by the duration resolver
    pub fn extent(&self) -> InputExtent {
        match self {
            InputSource::File(file) => InputExtent::new(file.trim, file.length),
            InputSource::NullAudio(null) => InputExtent::new(Trim::default(), null.duration),
            InputSource::Concat(concat) => InputExtent::new(concat.trim, concat.length()),
        }
    }
}

impl From<FileInput> for InputSource {
    fn from(input: FileInput) -> Self {
        InputSource::File(input)
    }
}

impl From<NullAudioInput> for InputSource {
    fn from(input: NullAudioInput) -> Self {
        InputSource::NullAudio(input)
    }
}

impl From<ConcatInput> for InputSource {
    fn from(input: ConcatInput) -> Self {
        InputSource::Concat(input)
    }
}

/// Distinct inputs in registration order. Index `n` is the `n`th `-i`.
#[derive(Debug, Default)]
pub struct InputRegistry {
    inputs: Vec<InputSource>,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source`, returning the index of an equal input if one is
    /// already present
    pub fn add(&mut self, source: impl Into<InputSource>) -> usize {
        let source = source.into();
        if let Some(index) = self.inputs.iter().position(|existing| *existing == source) {
            return index;
        }
        self.inputs.push(source);
        self.inputs.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&InputSource> {
        self.inputs.get(index)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputSource> {
        self.inputs.iter()
    }

    pub fn extents(&self) -> Vec<InputExtent> {
        self.inputs.iter().map(InputSource::extent).collect()
    }

    pub fn prepare(&mut self) -> Result<(), DomainError> {
        for input in &mut self.inputs {
            input.prepare()?;
        }
        Ok(())
    }

    /// Input blocks in index order
    pub fn to_arguments(&self) -> Result<Vec<String>, DomainError> {
        let mut args = Vec::new();
        for input in &self.inputs {
            args.extend(input.to_arguments()?);
        }
        Ok(args)
    }

    pub fn dispose(&mut self) {
        for input in &mut self.inputs {
            input.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: f64) -> TimeSpec {
        TimeSpec::from_seconds(value)
    }

    #[test]
    fn test_registry_deduplicates_equal_inputs() {
        let mut registry = InputRegistry::new();
        let a = registry.add(FileInput::new("a.mkv", secs(60.0)));
        let b = registry.add(FileInput::new("b.mkv", secs(60.0)));
        let a_again = registry.add(FileInput::new("a.mkv", secs(61.0)));

        assert_eq!((a, b, a_again), (0, 1, 0));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registry_trim_change_is_new_input() {
        let mut registry = InputRegistry::new();
        let plain = registry.add(FileInput::new("a.mkv", secs(60.0)));
        let trimmed = registry.add(
            FileInput::new("a.mkv", secs(60.0)).with_trim(Trim::new().with_start(secs(5.0))),
        );
        let trimmed_again = registry.add(
            FileInput::new("a.mkv", secs(60.0)).with_trim(Trim::new().with_start(secs(5.0))),
        );
        let stopped = registry.add(
            FileInput::new("a.mkv", secs(60.0))
                .with_trim(Trim::new().with_start(secs(5.0)).with_stop(secs(9.0))),
        );

        assert_eq!((plain, trimmed, trimmed_again, stopped), (0, 1, 1, 2));
    }

    #[test]
    fn test_file_input_arguments_put_trims_first() {
        let input: InputSource = FileInput::new("in.mkv", secs(60.0))
            .with_trim(Trim::new().with_start(secs(1.5)).with_duration(secs(10.0)))
            .into();
        assert_eq!(
            input.to_arguments().unwrap(),
            vec!["-ss", "00:00:01.5000", "-t", "00:00:10.0000", "-i", "in.mkv"]
        );
    }

    #[test]
    fn test_null_audio_arguments() {
        let input: InputSource = NullAudioInput::new(secs(3.0)).into();
        assert_eq!(
            input.to_arguments().unwrap(),
            vec!["-f", "lavfi", "-t", "00:00:03.0000", "-i", "anullsrc"]
        );
        assert_eq!(input.extent().effective_length(), secs(3.0));
    }

    #[test]
    fn test_concat_manifest_contents() {
        let concat = ConcatInput::new()
            .with_entry(ConcatEntry::new("/media/it's.mkv", secs(10.0)).with_inpoint(secs(2.0)))
            .with_chapter("1", secs(0.0), secs(8.0))
            .with_entry(ConcatEntry::new("/media/b.mkv", secs(20.0)).with_duration(secs(5.0)));

        assert_eq!(
            concat.manifest_contents(),
            "file '/media/it'\\''s.mkv'\n\
             inpoint 00:00:02.0000\n\
             chapter 1 00:00:00.0000 00:00:08.0000\n\
             file '/media/b.mkv'\n\
             duration 00:00:05.0000\n"
        );
        assert_eq!(concat.length(), secs(13.0));
    }

    #[test]
    fn test_concat_lifecycle() {
        let mut input: InputSource = ConcatInput::new()
            .with_entry(ConcatEntry::new("a.mkv", secs(10.0)))
            .into();

        assert!(matches!(input.to_arguments(), Err(DomainError::NotPrepared(_))));

        input.prepare().unwrap();
        let args = input.to_arguments().unwrap();
        assert_eq!(&args[..5], &["-f", "concat", "-safe", "0", "-i"]);
        let manifest = PathBuf::from(&args[5]);
        assert!(manifest.exists());
        let expected = std::env::current_dir().unwrap().join("a.mkv");
        assert_eq!(
            fs::read_to_string(&manifest).unwrap(),
            format!("file '{}'\n", expected.display())
        );

        input.dispose();
        assert!(!manifest.exists());
        input.dispose();
    }

    #[test]
    fn test_concat_manifest_entries_are_absolute() {
        let concat = ConcatInput::new().with_entry(ConcatEntry::new("clips/a.mkv", secs(1.0)));
        let contents = concat.manifest_contents();
        let path = contents
            .strip_prefix("file '")
            .and_then(|rest| rest.strip_suffix("'\n"))
            .unwrap();

        assert!(Path::new(path).is_absolute());
        assert_eq!(
            PathBuf::from(path),
            std::env::current_dir().unwrap().join("clips/a.mkv")
        );
    }

    #[test]
    fn test_concat_dispose_tolerates_missing_directory() {
        let mut concat = ConcatInput::new().with_entry(ConcatEntry::new("a.mkv", secs(1.0)));
        concat.prepare().unwrap();
        let dir = concat.manifest_path().unwrap().parent().unwrap().to_path_buf();
        fs::remove_dir_all(&dir).unwrap();
        concat.dispose();
        assert!(concat.manifest_path().is_none());
    }
}
