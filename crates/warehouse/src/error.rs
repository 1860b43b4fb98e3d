use thiserror::Error;

/// Unified error type for warehouse operations
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The warehouse API rejected a request
    #[error("Warehouse API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A load job completed with an error result
    #[error("Load job failed: {0}")]
    LoadJob(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for WarehouseError
pub type Result<T> = std::result::Result<T, WarehouseError>;
