//! Error types for the print bridge

use thiserror::Error;

/// Print bridge error types
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Job content is empty or whitespace only
    #[error("No invoice content to print")]
    EmptyContent,

    /// Job has no printer targets
    #[error("No printers configured")]
    NoTargetsConfigured,

    /// Embedded host detected but the native channel binding is missing
    #[error("Native channel unavailable")]
    ChannelUnavailable,

    /// Invoice content could not be fetched
    #[error("Content load failed: {0}")]
    ContentLoadFailure(String),

    /// Persisted history could not be parsed
    #[error("History deserialization failed: {0}")]
    HistoryDeserialization(#[source] serde_json::Error),

    /// Native channel transport failed while posting a message
    #[error("Channel error: {0}")]
    Channel(String),

    /// Fallback renderer failed to show or print the view
    #[error("Render failed: {0}")]
    Render(String),

    /// Local storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
