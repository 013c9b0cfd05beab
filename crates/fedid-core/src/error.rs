//! Error handling for fedid.
//!
//! Error messages are designed to be informative for debugging while not
//! exposing directory credentials, salts, or internal topology to callers.

use thiserror::Error;

/// Result type alias using the fedid error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for identity provider operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error. Aborts plugin load, never recoverable at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Attribute resolution failed for a principal.
    #[error("attribute resolution failed: {0}")]
    Resolution(String),

    /// Data source error (directory, database).
    #[error("data source error: {0}")]
    DataSource(String),

    /// SAML protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The requester is not authenticated or not authorized.
    #[error("access denied")]
    AccessDenied,

    /// Resource not found.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Internal error.
    #[error("internal error")]
    Internal,
}

impl Error {
    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::DataSource(_) | Self::Internal)
    }

    /// Returns whether this error represents a client error.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::AccessDenied | Self::NotFound(_) | Self::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_is_generic() {
        let error = Error::AccessDenied;
        assert_eq!(error.to_string(), "access denied");
    }

    #[test]
    fn internal_error_hides_details() {
        let error = Error::Internal;
        assert_eq!(error.to_string(), "internal error");
    }

    #[test]
    fn data_source_errors_are_server_errors() {
        assert!(Error::DataSource("db down".to_string()).is_server_error());
        assert!(!Error::NotFound("x".to_string()).is_server_error());
    }
}
