//! Classification of a finished ffmpeg run.

use thiserror::Error;

use crate::domain::model::ProcessOutput;
use crate::engine::error_codes;

/// ffmpeg sometimes exits 0 after printing this
const OUTPUT_OPEN_FAILURE_PREFIX: &str = "Error opening output file";

/// Why a job failed. A job without a reason succeeded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The runner could not start or follow the process
    #[error("Exception encountered: {0}")]
    Exception(String),

    /// Non-zero exit with a known ffmpeg error code
    #[error("{description} (exit code {code})")]
    ErrorCode { code: i32, description: &'static str },

    /// Non-zero exit with a code missing from the table
    #[error("Unknown error code {0}")]
    UnknownErrorCode(i32),

    /// Exit code 0, but the output file could not be opened
    #[error("Failed to open output file")]
    OutputOpenFailure,
}

/// Maps raw process output to an optional failure reason
pub struct ResultClassifier;

impl ResultClassifier {
    pub fn classify(output: &ProcessOutput) -> Option<FailureReason> {
        if let Some(message) = &output.exception {
            return Some(FailureReason::Exception(message.clone()));
        }

        if output.exit_code != 0 {
            return Some(match error_codes::describe(output.exit_code) {
                Some(description) => FailureReason::ErrorCode {
                    code: output.exit_code,
                    description,
                },
                None => FailureReason::UnknownErrorCode(output.exit_code),
            });
        }

        if output
            .stderr
            .iter()
            .any(|line| line.starts_with(OUTPUT_OPEN_FAILURE_PREFIX))
        {
            return Some(FailureReason::OutputOpenFailure);
        }

        None
    }
}
