// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Receives process output as it arrives, one line at a time
pub trait LineSink: Send {
    fn on_stdout(&mut self, line: &str);
    fn on_stderr(&mut self, line: &str);
}

/// Sink that drops every line
pub struct DiscardLines;

impl LineSink for DiscardLines {
    fn on_stdout(&mut self, _line: &str) {}
    fn on_stderr(&mut self, _line: &str) {}
}

/// Port for launching the external transcoder
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Program the runner launches, for logs and dry runs
    fn program(&self) -> String;

    /// Run to completion on the async runtime, streaming lines to `sink`
    async fn run(&self, args: &[String], sink: &mut dyn LineSink) -> ProcessOutput;

    /// Run to completion on the calling thread, streaming lines to `sink`
    fn run_blocking(&self, args: &[String], sink: &mut dyn LineSink) -> ProcessOutput;
}

/// Port for media file probing and analysis
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe media file and return its streams, chapters and duration
    async fn analyse(&self, path: &Path) -> Result<MediaAnalysis, DomainError>;
}
