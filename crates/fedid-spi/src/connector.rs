//! Data connector trait.

use std::fmt::Debug;

use async_trait::async_trait;
use fedid_model::{AttributeSet, ResolutionContext};

use crate::dependencies::Dependencies;
use crate::error::SpiResult;
use crate::plugin::PluginConfig;

/// Fetches raw attribute data for a principal from an external source.
///
/// Connector instances are created once at configuration load and shared by
/// every request thread; implementations must be effectively immutable after
/// construction, with any mutable state (connection health, pools) behind
/// their own synchronization.
#[async_trait]
pub trait DataConnector: Send + Sync + Debug {
    /// Returns the common plugin configuration.
    fn config(&self) -> &PluginConfig;

    /// Resolves the attribute set for the principal in `ctx`.
    ///
    /// Upstream results for this connector's declared dependencies are
    /// available through `deps`.
    ///
    /// # Errors
    ///
    /// Returns a resolution error when the source cannot be queried or the
    /// result violates the connector's constraints.
    async fn resolve(
        &self,
        ctx: &ResolutionContext,
        deps: &Dependencies,
    ) -> SpiResult<AttributeSet>;

    /// Verifies the connector can reach its source. Called at startup.
    ///
    /// # Errors
    ///
    /// Returns an error when the source is unreachable.
    async fn test_connection(&self) -> SpiResult<()> {
        Ok(())
    }
}
