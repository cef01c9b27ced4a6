//! Error handling module for ffwrap

use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::engine::result::FailureReason;

/// Main error type for ffwrap operations
#[derive(Error, Debug)]
pub enum FfwrapError {
    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// The transcode ran and ffmpeg reported a failure
    #[error("Transcode failed: {0}")]
    TranscodeFailed(FailureReason),

    /// Domain layer error
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result type alias for ffwrap operations
pub type FfwrapResult<T> = std::result::Result<T, FfwrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_stay_transparent() {
        let err: FfwrapError = DomainError::FileNotFound("a.mkv".to_string()).into();
        assert_eq!(err.to_string(), "File not found: a.mkv");
    }

    #[test]
    fn test_transcode_failure_message() {
        let err = FfwrapError::TranscodeFailed(FailureReason::OutputOpenFailure);
        assert_eq!(err.to_string(), "Transcode failed: Failed to open output file");
    }
}
