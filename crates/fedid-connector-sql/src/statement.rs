//! Pluggable statement parameterization and row extraction.

use std::fmt::Debug;

use fedid_model::{AttributeValue, ResolutionContext};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row};

use crate::error::{SqlConnectorError, SqlConnectorResult};

/// Where a bind parameter's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSource {
    /// The principal name.
    Principal,
    /// The requesting relying party's entity ID.
    Requester,
    /// The responding identity provider's entity ID.
    Responder,
}

/// Produces the bind values for the connector's query.
pub trait StatementCreator: Send + Sync + Debug {
    /// Returns the values to bind, in placeholder order.
    ///
    /// # Errors
    ///
    /// Returns an error when a required parameter is unavailable in the
    /// context.
    fn bind_values(&self, ctx: &ResolutionContext) -> SqlConnectorResult<Vec<String>>;
}

/// Default statement creator: binds context fields positionally.
#[derive(Debug, Clone, Default)]
pub struct PositionalStatementCreator {
    sources: Vec<ParameterSource>,
}

impl PositionalStatementCreator {
    /// Creates a creator binding the given sources in order.
    #[must_use]
    pub fn new(sources: Vec<ParameterSource>) -> Self {
        Self { sources }
    }
}

impl StatementCreator for PositionalStatementCreator {
    fn bind_values(&self, ctx: &ResolutionContext) -> SqlConnectorResult<Vec<String>> {
        self.sources
            .iter()
            .map(|source| match source {
                ParameterSource::Principal => Ok(ctx.principal.clone()),
                ParameterSource::Requester => {
                    ctx.requester().map(str::to_string).ok_or_else(|| {
                        SqlConnectorError::Query(
                            "query binds the requester but none is present".to_string(),
                        )
                    })
                }
                ParameterSource::Responder => {
                    ctx.responder.clone().ok_or_else(|| {
                        SqlConnectorError::Query(
                            "query binds the responder but none is present".to_string(),
                        )
                    })
                }
            })
            .collect()
    }
}

/// Extracts attribute values from one result row.
pub trait RowExtractor: Send + Sync + Debug {
    /// Returns (attribute name, value) pairs for the row.
    ///
    /// # Errors
    ///
    /// Returns an error when the row cannot be read at all; individual
    /// unsupported columns are skipped, not fatal.
    fn extract(&self, row: &PgRow) -> SqlConnectorResult<Vec<(String, AttributeValue)>>;
}

/// Default extractor: every column becomes a same-named attribute.
///
/// Text columns map to text values, bytea columns to byte values; NULLs
/// and columns of other types are skipped with a debug log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnRowExtractor;

impl RowExtractor for ColumnRowExtractor {
    fn extract(&self, row: &PgRow) -> SqlConnectorResult<Vec<(String, AttributeValue)>> {
        let mut values = Vec::with_capacity(row.columns().len());
        for (index, column) in row.columns().iter().enumerate() {
            let name = column.name().to_string();

            if let Ok(text) = row.try_get::<Option<String>, _>(index) {
                if let Some(text) = text {
                    values.push((name, AttributeValue::Text(text)));
                }
                continue;
            }
            if let Ok(bytes) = row.try_get::<Option<Vec<u8>>, _>(index) {
                if let Some(bytes) = bytes {
                    values.push((name, AttributeValue::Bytes(bytes)));
                }
                continue;
            }
            tracing::debug!(column = %name, "skipping column with unsupported type");
        }
        Ok(values)
    }
}
