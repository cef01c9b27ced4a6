// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;
use crate::domain::model::{LogFormat, LogLevel};

/// Tracing log adapter
pub struct TracingLogAdapter;

impl TracingLogAdapter {
    /// Filter for the configured level; `RUST_LOG` wins when it is set
    pub fn filter(level: LogLevel) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
    }

    /// Install the global subscriber. Logs go to stderr so stdout stays
    /// free for JSON output.
    pub fn init(level: LogLevel, format: LogFormat) -> Result<(), DomainError> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(Self::filter(level))
            .with_writer(std::io::stderr)
            .with_target(false);

        let installed = match format {
            LogFormat::Pretty => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };

        installed.map_err(|e| DomainError::ProcessingError(format!("Failed to initialise logging: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_error() {
        let _ = TracingLogAdapter::init(LogLevel::Warn, LogFormat::Pretty);
        assert!(TracingLogAdapter::init(LogLevel::Warn, LogFormat::Json).is_err());
    }
}
