use std::process::ExitStatus;
use thiserror::Error;

/// Unified error type for the extraction tool wrapper
#[derive(Debug, Error)]
pub enum DapError {
    /// The extraction subprocess exited non-zero
    #[error("Extraction command '{operation}' failed ({status}): {stderr}")]
    ExtractionFailed {
        operation: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The extraction tool produced output that is not valid UTF-8
    #[error("Extraction command '{operation}' produced non-UTF-8 output")]
    NonUtf8Output { operation: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DapError
pub type Result<T> = std::result::Result<T, DapError>;
