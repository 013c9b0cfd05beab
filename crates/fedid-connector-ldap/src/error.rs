//! LDAP connector error types.
//!
//! Error messages must not leak bind credentials or directory structure
//! beyond what the operator configured.

use thiserror::Error;

/// Result type alias for LDAP connector operations.
pub type LdapConnectorResult<T> = std::result::Result<T, LdapConnectorError>;

/// Errors raised by the LDAP data connector.
#[derive(Debug, Error)]
pub enum LdapConnectorError {
    /// Invalid configuration.
    #[error("LDAP configuration error: {0}")]
    Configuration(String),

    /// Connection URL must use LDAPS.
    #[error("only LDAPS is supported; the URL must start with 'ldaps://'")]
    InsecureProtocol,

    /// Connecting or binding to the directory failed.
    #[error("directory connection failed: {0}")]
    Connection(String),

    /// The search operation failed.
    #[error("directory search failed: {0}")]
    Search(String),

    /// The search matched no entry.
    #[error("no directory entry matched the principal")]
    NoEntry,

    /// The search matched more than one entry.
    #[error("search matched {0} entries; cannot disambiguate")]
    AmbiguousEntry(usize),
}

impl LdapConnectorError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns whether a fresh connection is worth one retry.
    ///
    /// Connection-class failures (connect, bind, transport) are retried;
    /// search results (bad filter, no entry, ambiguity) are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connection_errors_are_retryable() {
        assert!(LdapConnectorError::Connection("reset".to_string()).is_retryable());
        assert!(!LdapConnectorError::NoEntry.is_retryable());
        assert!(!LdapConnectorError::AmbiguousEntry(2).is_retryable());
        assert!(!LdapConnectorError::Search("bad filter".to_string()).is_retryable());
    }
}
