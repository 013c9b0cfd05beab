//! Application state shared by request handlers.

use std::sync::Arc;

use fedid_resolver::AttributeResolver;

use crate::config::ServerConfig;

/// State handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// The attribute resolver.
    pub resolver: Arc<AttributeResolver>,
}

impl AppState {
    /// Creates the application state.
    #[must_use]
    pub fn new(config: ServerConfig, resolver: Arc<AttributeResolver>) -> Self {
        Self {
            config: Arc::new(config),
            resolver,
        }
    }

    /// Returns the resolver.
    #[must_use]
    pub fn resolver(&self) -> &AttributeResolver {
        &self.resolver
    }
}
