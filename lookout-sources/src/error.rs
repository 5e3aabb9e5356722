//! Error types for the lookout-sources crate.
//!
//! All errors use stable string messages suitable for display in a
//! failure toast. A cancelled request is its own variant so callers can
//! drop it without telling the user.

/// Errors that can occur while fetching or extracting records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The request was superseded or its screen was closed.
    #[error("request cancelled")]
    Cancelled,

    /// The HTTP request failed or returned a non-2xx status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The feed or page could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// A detail lookup found no entity for the requested id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid source configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SourceError {
    /// Whether this outcome came from cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Convenience type alias for lookout-sources results.
pub type Result<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_cancelled() {
        assert_eq!(SourceError::Cancelled.to_string(), "request cancelled");
    }

    #[test]
    fn display_http() {
        let err = SourceError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_parse() {
        let err = SourceError::Parse("missing channel".into());
        assert_eq!(err.to_string(), "parse error: missing channel");
    }

    #[test]
    fn display_not_found() {
        let err = SourceError::NotFound("game 42".into());
        assert_eq!(err.to_string(), "not found: game 42");
    }

    #[test]
    fn only_cancelled_is_cancelled() {
        assert!(SourceError::Cancelled.is_cancelled());
        assert!(!SourceError::Http("x".into()).is_cancelled());
        assert!(!SourceError::Parse("x".into()).is_cancelled());
        assert!(!SourceError::NotFound("x".into()).is_cancelled());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SourceError>();
    }
}
