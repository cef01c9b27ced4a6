// Transcode interactor - Runs one assembled job against the process runner

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::command::TranscodeJob;
use crate::engine::progress::{ProgressDispatcher, ProgressParser};
use crate::engine::result::{FailureReason, ResultClassifier};
use crate::error::{FfwrapError, FfwrapResult};
use crate::ports::*;

/// Diagnostic lines kept in the report of a failed job
pub const STDERR_TAIL_LINES: usize = 10;

/// Outcome of one executed job
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    /// `None` means the job succeeded
    pub failure: Option<FailureReason>,
    pub expected_duration: TimeSpec,
    pub elapsed: Duration,
    /// Last diagnostic lines, only filled for failed jobs
    pub stderr_tail: Vec<String>,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// The report itself on success, the failure reason otherwise
    pub fn into_result(self) -> FfwrapResult<JobReport> {
        match self.failure {
            Some(reason) => Err(FfwrapError::TranscodeFailed(reason)),
            None => Ok(self),
        }
    }
}

/// Feeds runner output into the job's parser and forwards events
struct ProgressSink<'a> {
    parser: ProgressParser,
    dispatcher: &'a ProgressDispatcher,
}

impl<'a> ProgressSink<'a> {
    fn new(expected: TimeSpec, dispatcher: &'a ProgressDispatcher) -> Self {
        Self {
            parser: ProgressParser::with_expected_duration(expected),
            dispatcher,
        }
    }

    fn complete(mut self) {
        let events = self.parser.force_complete();
        self.dispatcher.dispatch(&events);
    }
}

impl LineSink for ProgressSink<'_> {
    fn on_stdout(&mut self, line: &str) {
        let events = self.parser.parse_stdout_line(line);
        self.dispatcher.dispatch(&events);
    }

    fn on_stderr(&mut self, line: &str) {
        let events = self.parser.parse_stderr_line(line);
        self.dispatcher.dispatch(&events);
    }
}

/// Temporary input resources live exactly as long as this guard
struct PreparedJob<'a> {
    job: &'a mut TranscodeJob,
}

impl<'a> PreparedJob<'a> {
    fn prepare(job: &'a mut TranscodeJob) -> Result<Self, DomainError> {
        let guard = Self { job };
        guard.job.prepare()?;
        Ok(guard)
    }
}

impl Drop for PreparedJob<'_> {
    fn drop(&mut self) {
        self.job.dispose();
    }
}

/// Interactor for the transcode use case
pub struct TranscodeInteractor {
    runner: Arc<dyn ProcessRunner>,
}

impl TranscodeInteractor {
    /// Create new transcode interactor with injected runner
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Program the runner launches
    pub fn program(&self) -> String {
        self.runner.program()
    }

    /// Run the job on the async runtime
    pub async fn execute(
        &self,
        job: &mut TranscodeJob,
        dispatcher: &ProgressDispatcher,
    ) -> Result<JobReport, DomainError> {
        let expected = job.expected_duration();
        let prepared = PreparedJob::prepare(job)?;
        let args = prepared.job.to_arguments()?;

        info!("Starting transcode to {}", prepared.job.output().path().display());
        dispatcher.start(expected);
        let started = Instant::now();
        let mut sink = ProgressSink::new(expected, dispatcher);
        let output = self.runner.run(&args, &mut sink).await;
        drop(prepared);

        Ok(Self::finish(sink, output, expected, started))
    }

    /// Run the job on the calling thread
    pub fn execute_blocking(
        &self,
        job: &mut TranscodeJob,
        dispatcher: &ProgressDispatcher,
    ) -> Result<JobReport, DomainError> {
        let expected = job.expected_duration();
        let prepared = PreparedJob::prepare(job)?;
        let args = prepared.job.to_arguments()?;

        info!("Starting transcode to {}", prepared.job.output().path().display());
        dispatcher.start(expected);
        let started = Instant::now();
        let mut sink = ProgressSink::new(expected, dispatcher);
        let output = self.runner.run_blocking(&args, &mut sink);
        drop(prepared);

        Ok(Self::finish(sink, output, expected, started))
    }

    fn finish(
        sink: ProgressSink<'_>,
        output: ProcessOutput,
        expected: TimeSpec,
        started: Instant,
    ) -> JobReport {
        let dispatcher = sink.dispatcher;
        sink.complete();

        let failure = ResultClassifier::classify(&output);
        dispatcher.complete(failure.as_ref());

        let elapsed = started.elapsed();
        let stderr_tail = match &failure {
            Some(reason) => {
                warn!("Transcode failed after {:.1}s: {}", elapsed.as_secs_f64(), reason);
                let skip = output.stderr.len().saturating_sub(STDERR_TAIL_LINES);
                output.stderr[skip..].to_vec()
            }
            None => {
                info!("Transcode finished in {:.1}s", elapsed.as_secs_f64());
                Vec::new()
            }
        };

        JobReport {
            failure,
            expected_duration: expected,
            elapsed,
            stderr_tail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(exit_code: i32, stderr: usize) -> ProcessOutput {
        ProcessOutput {
            exit_code,
            stderr: (0..stderr).map(|i| format!("line {}", i)).collect(),
            ..ProcessOutput::default()
        }
    }

    fn finish(output: ProcessOutput) -> JobReport {
        let dispatcher = ProgressDispatcher::new();
        let sink = ProgressSink::new(TimeSpec::ZERO, &dispatcher);
        TranscodeInteractor::finish(sink, output, TimeSpec::ZERO, Instant::now())
    }

    #[test]
    fn test_failed_report_keeps_last_lines() {
        let report = finish(output(1, 25));
        assert_eq!(report.stderr_tail.len(), STDERR_TAIL_LINES);
        assert_eq!(report.stderr_tail.first().map(String::as_str), Some("line 15"));
        assert_eq!(report.stderr_tail.last().map(String::as_str), Some("line 24"));
    }

    #[test]
    fn test_successful_report_has_no_tail() {
        let report = finish(output(0, 5));
        assert!(report.succeeded());
        assert!(report.stderr_tail.is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_into_result_carries_reason() {
        let err = finish(output(1, 0)).into_result().unwrap_err();
        assert!(matches!(
            err,
            FfwrapError::TranscodeFailed(FailureReason::UnknownErrorCode(1))
        ));
    }
}
