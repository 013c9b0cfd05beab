//! Error type for SPI operations.

use thiserror::Error;

/// Result type alias for SPI operations.
pub type SpiResult<T> = std::result::Result<T, SpiError>;

/// Errors raised by plugin configuration, lookup, and resolution.
#[derive(Debug, Error)]
pub enum SpiError {
    /// Invalid plugin configuration. Fails fast at load time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No factory registered for a plugin type.
    #[error("unknown plugin type: {0}")]
    UnknownPluginType(String),

    /// A declared dependency does not exist in the resolver.
    #[error("plugin {plugin} depends on unknown plugin {dependency}")]
    MissingDependency {
        /// The plugin declaring the dependency.
        plugin: String,
        /// The dependency id that could not be found.
        dependency: String,
    },

    /// A plugin failed while resolving.
    #[error("plugin {plugin} failed to resolve: {reason}")]
    Resolution {
        /// The failing plugin id.
        plugin: String,
        /// Cause, free of credentials.
        reason: String,
    },
}

impl SpiError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a resolution error for a plugin.
    #[must_use]
    pub fn resolution(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }
}
