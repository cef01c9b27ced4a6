//! ffwrap library
//!
//! Declarative ffmpeg jobs: inputs, filter graphs and stream mappings are
//! assembled into an argument list, ffmpeg runs as a child process, and its
//! diagnostic output is turned into progress events and a normalized result.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{FfwrapSettings, MediaAnalysis, ProcessOutput, TimeSpec, Trim};
pub use engine::{FailureReason, TranscodeBuilder, TranscodeJob};
pub use error::{FfwrapError, FfwrapResult};
