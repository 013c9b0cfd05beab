//! # fedid-connector-sql
//!
//! Data connector backed by a relational database.
//!
//! The connector owns a lazily-connected `sqlx` pool, runs one
//! parameterized query per resolve, extracts columns into attribute
//! values, and guards the database with a dead-connection circuit
//! breaker: after a query execution failure, new attempts are refused
//! until the configured retry interval has elapsed.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod breaker;
pub mod config;
pub mod connector;
pub mod error;
pub mod statement;

pub use breaker::CircuitBreaker;
pub use config::SqlConnectorOptions;
pub use connector::{register_sql_connector, SqlDataConnector};
pub use error::{SqlConnectorError, SqlConnectorResult};
pub use statement::{
    ColumnRowExtractor, ParameterSource, PositionalStatementCreator, RowExtractor,
    StatementCreator,
};
