use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for schema loading and selection
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema document does not exist
    #[error("Schema document not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Schema document is not valid JSON
    #[error("Malformed schema document {}: {}", .path.display(), .source)]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SchemaError
pub type Result<T> = std::result::Result<T, SchemaError>;
