//! Command assembly and execution monitoring.
//!
//! This module turns a declarative job description into ffmpeg arguments
//! and interprets what ffmpeg reports back while and after it runs.

pub mod codecs;
pub mod command;
pub mod error_codes;
pub mod filter_graph;
pub mod filters;
pub mod inputs;
pub mod output;
pub mod progress;
pub mod result;
pub mod streams;

pub use codecs::{AudioCodec, Codec, LibSvtAv1, Libx264, SubtitleCodec, VideoCodec, X264Preset};
pub use command::{display_command, OverwritePolicy, TranscodeBuilder, TranscodeJob};
pub use filter_graph::FilterGraph;
pub use filters::{Filter, ScaleResolution};
pub use inputs::{ConcatEntry, ConcatInput, FileInput, InputRegistry, InputSource, NullAudioInput};
pub use output::OutputFile;
pub use progress::{ProgressCallback, ProgressDispatcher, ProgressEvent, ProgressParser};
pub use result::{FailureReason, ResultClassifier};
pub use streams::{Language, StreamFlag, StreamOptions, StreamReference};
