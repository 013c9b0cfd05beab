//! SQL connector configuration.

use serde::{Deserialize, Serialize};

use crate::error::{SqlConnectorError, SqlConnectorResult};
use crate::statement::ParameterSource;

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_retry_interval_secs() -> u64 {
    300
}

/// Options for the SQL data connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlConnectorOptions {
    /// Database connection URL.
    pub url: String,

    /// Query executed per resolve, with `$1`-style placeholders.
    pub query: String,

    /// What to bind to each placeholder, in order.
    #[serde(default)]
    pub parameters: Vec<ParameterSource>,

    /// Minimum connections kept in the pool.
    #[serde(default)]
    pub min_connections: u32,

    /// Maximum connections in the pool. Callers block up to the acquire
    /// timeout when the pool is exhausted.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds a caller waits for a pooled connection.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// Minimum rows the query must return.
    #[serde(default)]
    pub min_rows: usize,

    /// Maximum rows the query may return. 0 means unbounded.
    #[serde(default)]
    pub max_rows: usize,

    /// Seconds the connector stays dead after a query execution failure.
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

impl Default for SqlConnectorOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            query: String::new(),
            parameters: Vec::new(),
            min_connections: 0,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            min_rows: 0,
            max_rows: 0,
            retry_interval_secs: default_retry_interval_secs(),
        }
    }
}

impl SqlConnectorOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a missing URL or query, or
    /// inconsistent row bounds.
    pub fn validate(&self) -> SqlConnectorResult<()> {
        if self.url.is_empty() {
            return Err(SqlConnectorError::config("url is required"));
        }
        if self.query.is_empty() {
            return Err(SqlConnectorError::config("query is required"));
        }
        if self.max_rows != 0 && self.min_rows > self.max_rows {
            return Err(SqlConnectorError::config(format!(
                "min_rows {} exceeds max_rows {}",
                self.min_rows, self.max_rows
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SqlConnectorOptions {
        SqlConnectorOptions {
            url: "postgres://localhost/identity".to_string(),
            query: "SELECT mail, display_name FROM people WHERE uid = $1".to_string(),
            parameters: vec![ParameterSource::Principal],
            ..SqlConnectorOptions::default()
        }
    }

    #[test]
    fn valid_options_pass() {
        assert!(options().validate().is_ok());
    }

    #[test]
    fn missing_query_is_rejected() {
        let mut opts = options();
        opts.query.clear();
        assert!(opts.validate().is_err());
    }

    #[test]
    fn inverted_row_bounds_are_rejected() {
        let mut opts = options();
        opts.min_rows = 5;
        opts.max_rows = 2;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn zero_max_rows_means_unbounded() {
        let mut opts = options();
        opts.min_rows = 5;
        opts.max_rows = 0;
        assert!(opts.validate().is_ok());
    }
}
