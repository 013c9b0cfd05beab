//! # fedid-resolver
//!
//! The attribute resolver: a dependency-graph-driven pipeline combining
//! data connectors (raw identity data) and attribute definitions (derived
//! values) into the resolved attributes for one principal/requester pair.
//!
//! The graph is validated once at configuration load; each request walks
//! the closure of the requested attributes in dependency order, consulting
//! the per-plugin TTL cache, honoring error-propagation flags, and invoking
//! failover connectors when a primary source fails quietly.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod connectors;
pub mod definitions;
pub mod error;
mod graph;
pub mod resolver;

pub use connectors::StaticDataConnector;
pub use definitions::{register_builtin_definitions, ScriptBindings, ScriptHost};
pub use error::{ResolverError, ResolverResult};
pub use resolver::{AttributeResolver, AttributeResolverBuilder};

use fedid_spi::PluginRegistry;

/// Registers the built-in connector and definition types on a registry.
///
/// Connector types: `static`. Definition types: `simple`, `composite`,
/// `mapped`, `regex`, `formatted`, `persistent-id`. The `scriptlet` type
/// needs a script host and is registered separately via
/// [`definitions::register_scriptlet_definition`].
pub fn register_builtin_plugins(registry: &PluginRegistry) {
    connectors::register_builtin_connectors(registry);
    definitions::register_builtin_definitions(registry);
}
