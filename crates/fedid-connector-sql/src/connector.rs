//! The SQL data connector.

use std::time::Duration;

use async_trait::async_trait;
use fedid_model::{AttributeSet, ResolutionContext};
use fedid_spi::{
    DataConnector, Dependencies, PluginConfig, PluginRegistry, PluginSettings, SpiError,
    SpiResult,
};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::breaker::CircuitBreaker;
use crate::config::SqlConnectorOptions;
use crate::error::{SqlConnectorError, SqlConnectorResult};
use crate::statement::{
    ColumnRowExtractor, PositionalStatementCreator, RowExtractor, StatementCreator,
};

/// Data connector backed by a relational database.
pub struct SqlDataConnector {
    config: PluginConfig,
    options: SqlConnectorOptions,
    pool: PgPool,
    breaker: CircuitBreaker,
    statement: Box<dyn StatementCreator>,
    extractor: Box<dyn RowExtractor>,
}

impl std::fmt::Debug for SqlDataConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlDataConnector")
            .field("config", &self.config)
            .field("query", &self.options.query)
            .finish_non_exhaustive()
    }
}

impl SqlDataConnector {
    /// Builds the connector from settings.
    ///
    /// The pool connects lazily: construction validates configuration but
    /// does not touch the database.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid settings or a malformed
    /// connection URL.
    pub fn from_settings(settings: &PluginSettings) -> SpiResult<Self> {
        let config = PluginConfig::from_settings(settings)?;
        let options: SqlConnectorOptions = settings.typed_options()?;
        options
            .validate()
            .map_err(|e| SpiError::config(format!("plugin {}: {e}", config.id())))?;

        let pool = PgPoolOptions::new()
            .min_connections(options.min_connections)
            .max_connections(options.max_connections)
            .acquire_timeout(Duration::from_secs(options.acquire_timeout_secs))
            .connect_lazy(&options.url)
            .map_err(|e| SpiError::config(format!("plugin {}: invalid url: {e}", config.id())))?;

        let breaker = CircuitBreaker::new(Duration::from_secs(options.retry_interval_secs));
        let statement = Box::new(PositionalStatementCreator::new(options.parameters.clone()));

        Ok(Self {
            config,
            options,
            pool,
            breaker,
            statement,
            extractor: Box::new(ColumnRowExtractor),
        })
    }

    /// Replaces the statement creator.
    #[must_use]
    pub fn with_statement_creator(mut self, statement: Box<dyn StatementCreator>) -> Self {
        self.statement = statement;
        self
    }

    /// Replaces the row extractor.
    #[must_use]
    pub fn with_row_extractor(mut self, extractor: Box<dyn RowExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Returns the circuit breaker, mainly for health reporting.
    #[must_use]
    pub const fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    async fn query(&self, ctx: &ResolutionContext) -> SqlConnectorResult<AttributeSet> {
        self.breaker
            .check()
            .map_err(|remaining| SqlConnectorError::SourceDead {
                remaining_secs: remaining.as_secs(),
            })?;

        let mut query = sqlx::query(&self.options.query);
        for value in self.statement.bind_values(ctx)? {
            query = query.bind(value);
        }

        let rows = match query.fetch_all(&self.pool).await {
            Ok(rows) => {
                self.breaker.reset();
                rows
            }
            Err(e) => {
                // Execution failures mark the source dead; bounds
                // violations below do not.
                self.breaker.trip();
                tracing::warn!(
                    plugin_id = %self.config.id(),
                    error = %e,
                    "query execution failed, marking data source dead"
                );
                return Err(SqlConnectorError::Query(e.to_string()));
            }
        };

        let row_count = rows.len();
        if row_count < self.options.min_rows
            || (self.options.max_rows != 0 && row_count > self.options.max_rows)
        {
            return Err(SqlConnectorError::RowBounds {
                rows: row_count,
                min: self.options.min_rows,
                max: self.options.max_rows,
            });
        }

        let mut set = AttributeSet::new();
        for row in &rows {
            for (name, value) in self.extractor.extract(row)? {
                set.add(name, value);
            }
        }
        Ok(set)
    }
}

#[async_trait]
impl DataConnector for SqlDataConnector {
    fn config(&self) -> &PluginConfig {
        &self.config
    }

    async fn resolve(
        &self,
        ctx: &ResolutionContext,
        _deps: &Dependencies,
    ) -> SpiResult<AttributeSet> {
        self.query(ctx)
            .await
            .map_err(|e| SpiError::resolution(self.config.id(), e.to_string()))
    }

    async fn test_connection(&self) -> SpiResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| SpiError::resolution(self.config.id(), e.to_string()))
    }
}

/// Registers the `sql` connector type.
pub fn register_sql_connector(registry: &PluginRegistry) {
    registry.register_connector("sql", |settings| {
        Ok(Box::new(SqlDataConnector::from_settings(settings)?) as Box<dyn DataConnector>)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::ParameterSource;

    fn settings() -> PluginSettings {
        PluginSettings::new("db", "sql").with_options(&SqlConnectorOptions {
            url: "postgres://localhost/identity".to_string(),
            query: "SELECT mail FROM people WHERE uid = $1".to_string(),
            parameters: vec![ParameterSource::Principal],
            retry_interval_secs: 30,
            ..SqlConnectorOptions::default()
        })
    }

    #[tokio::test]
    async fn construction_is_lazy_and_validates_options() {
        // No database is running; lazy pooling means this still succeeds.
        let connector = SqlDataConnector::from_settings(&settings()).unwrap();
        assert_eq!(connector.config().id(), "db");
        assert_eq!(
            connector.breaker().retry_interval(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn missing_query_fails_construction() {
        let settings = PluginSettings::new("db", "sql").with_options(&SqlConnectorOptions {
            url: "postgres://localhost/identity".to_string(),
            ..SqlConnectorOptions::default()
        });
        assert!(SqlDataConnector::from_settings(&settings).is_err());
    }

    #[tokio::test]
    async fn open_breaker_fails_fast_without_touching_the_pool() {
        let connector = SqlDataConnector::from_settings(&settings()).unwrap();
        connector.breaker().trip();

        // The URL points at nothing; if the pool were touched this would
        // fail with a connection error after a timeout, not SourceDead.
        let result = connector.query(&ResolutionContext::new("jdoe")).await;
        assert!(matches!(result, Err(SqlConnectorError::SourceDead { .. })));
    }

    #[tokio::test]
    async fn reset_breaker_allows_attempts_again() {
        let connector = SqlDataConnector::from_settings(&settings()).unwrap();
        connector.breaker().trip();
        connector.breaker().reset();
        assert!(connector.breaker().check().is_ok());
    }
}
