//! SQL connector error types.
//!
//! Messages never include bind values: principals and requester ids are
//! fine in logs, but query errors quoting data are not.

use thiserror::Error;

/// Result type alias for SQL connector operations.
pub type SqlConnectorResult<T> = std::result::Result<T, SqlConnectorError>;

/// Errors raised by the SQL data connector.
#[derive(Debug, Error)]
pub enum SqlConnectorError {
    /// Invalid configuration.
    #[error("SQL connector configuration error: {0}")]
    Configuration(String),

    /// Query execution failed.
    #[error("query execution failed: {0}")]
    Query(String),

    /// The circuit breaker is open; the source was recently unreachable.
    #[error("data source marked dead, retrying in {remaining_secs}s")]
    SourceDead {
        /// Seconds until the next attempt is allowed.
        remaining_secs: u64,
    },

    /// The result row count violated the configured bounds.
    #[error("result row count {rows} outside bounds [{min}, {max}]")]
    RowBounds {
        /// Rows returned.
        rows: usize,
        /// Configured minimum.
        min: usize,
        /// Configured maximum (0 = unbounded).
        max: usize,
    },

    /// A column could not be read from a result row.
    #[error("column extraction failed: {0}")]
    Extraction(String),
}

impl SqlConnectorError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
