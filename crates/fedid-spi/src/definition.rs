//! Attribute definition trait.

use std::fmt::Debug;

use fedid_model::{ResolutionContext, ResolverAttribute};

use crate::dependencies::Dependencies;
use crate::error::SpiResult;
use crate::plugin::PluginConfig;

/// Derives one logical attribute's values from upstream results.
///
/// Definitions mutate the attribute handed to them - adding values and
/// setting the encoder - and never replace it. The orchestrator marks the
/// attribute resolved after a successful call (or after a swallowed
/// failure when error propagation is disabled).
pub trait AttributeDefinition: Send + Sync + Debug {
    /// Returns the common plugin configuration.
    fn config(&self) -> &PluginConfig;

    /// Populates `attribute` from the upstream results in `deps`.
    ///
    /// # Errors
    ///
    /// Returns a resolution error when the definition cannot produce its
    /// values. Per-value problems are logged and skipped, not returned.
    fn resolve(
        &self,
        attribute: &mut ResolverAttribute,
        ctx: &ResolutionContext,
        deps: &Dependencies,
    ) -> SpiResult<()>;
}
