//! Error types for lookout.

use lookout_sources::SourceError;

/// Top-level error type for sessions, configuration and the host bridge.
#[derive(Debug, thiserror::Error)]
pub enum LookoutError {
    /// Fetch or extraction error from a source.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Host protocol error (bad envelope, unknown screen, ...).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, LookoutError>;
