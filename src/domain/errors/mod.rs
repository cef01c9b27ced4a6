// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// Text that should have been a time value or probe document could not be read
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// The probe collaborator failed to analyse a file
    #[error("Probe failed: {0}")]
    ProbeFailed(String),
    /// Temporary resources for an input could not be created
    #[error("Failed to prepare input: {0}")]
    PrepareFailed(String),
    /// An input was serialized before `prepare` ran
    #[error("Input not prepared: {0}")]
    NotPrepared(String),
    /// Processing error
    #[error("Processing error: {0}")]
    ProcessingError(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::ProcessingError(err.to_string())
    }
}
