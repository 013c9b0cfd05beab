//! Common plugin configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SpiError, SpiResult};

/// Placeholder substituted with the principal name in connector templates
/// (static attribute values, directory search filters).
pub const PRINCIPAL_TOKEN: &str = "%PRINCIPAL%";

fn default_true() -> bool {
    true
}

/// Raw plugin settings as loaded from the resolver configuration document.
///
/// `options` carries the plugin-type-specific part of the configuration;
/// factories deserialize it into their own typed option structs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Unique plugin id within the resolver.
    pub id: String,

    /// Plugin type name, resolved through the registry.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Seconds a resolved result may be cached. 0 means never cache.
    #[serde(default)]
    pub cache_ttl_secs: u64,

    /// Whether a failure aborts dependents (true) or is swallowed (false).
    #[serde(default = "default_true")]
    pub propagate_errors: bool,

    /// Ids of data connectors this plugin reads from, in declaration order.
    #[serde(default)]
    pub connector_dependencies: Vec<String>,

    /// Ids of attribute definitions this plugin reads from, in declaration
    /// order.
    #[serde(default)]
    pub attribute_dependencies: Vec<String>,

    /// Backup connector invoked when this connector fails and error
    /// propagation is disabled. Only meaningful for data connectors.
    #[serde(default)]
    pub failover: Option<String>,

    /// Plugin-type-specific options.
    #[serde(default)]
    pub options: serde_json::Value,
}

impl PluginSettings {
    /// Creates minimal settings for a plugin type, mainly for tests and
    /// programmatic construction.
    #[must_use]
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            cache_ttl_secs: 0,
            propagate_errors: true,
            connector_dependencies: Vec::new(),
            attribute_dependencies: Vec::new(),
            failover: None,
            options: serde_json::Value::Null,
        }
    }

    /// Adds a connector dependency.
    #[must_use]
    pub fn with_connector_dependency(mut self, id: impl Into<String>) -> Self {
        self.connector_dependencies.push(id.into());
        self
    }

    /// Adds an attribute dependency.
    #[must_use]
    pub fn with_attribute_dependency(mut self, id: impl Into<String>) -> Self {
        self.attribute_dependencies.push(id.into());
        self
    }

    /// Sets the cache TTL in seconds.
    #[must_use]
    pub const fn with_cache_ttl(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Sets error propagation.
    #[must_use]
    pub const fn with_propagate_errors(mut self, propagate: bool) -> Self {
        self.propagate_errors = propagate;
        self
    }

    /// Sets the failover connector id.
    #[must_use]
    pub fn with_failover(mut self, id: impl Into<String>) -> Self {
        self.failover = Some(id.into());
        self
    }

    /// Sets the plugin-type-specific options from a serializable struct.
    ///
    /// # Panics
    ///
    /// Panics if the options cannot be represented as JSON; intended for
    /// test and bootstrap code with known-good types.
    #[must_use]
    pub fn with_options<T: Serialize>(mut self, options: &T) -> Self {
        self.options = serde_json::to_value(options).expect("options serialize");
        self
    }

    /// Deserializes the plugin-type-specific options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the plugin when the options do
    /// not match the expected shape.
    pub fn typed_options<T: for<'de> Deserialize<'de> + Default>(&self) -> SpiResult<T> {
        if self.options.is_null() {
            return Ok(T::default());
        }
        serde_json::from_value(self.options.clone()).map_err(|e| {
            SpiError::config(format!("plugin {}: invalid options: {e}", self.id))
        })
    }
}

/// Validated configuration common to every plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    id: String,
    cache_ttl: Duration,
    propagate_errors: bool,
    connector_dependencies: Vec<String>,
    attribute_dependencies: Vec<String>,
    failover: Option<String>,
}

impl PluginConfig {
    /// Validates raw settings into a plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the id is empty or any dependency
    /// id is an empty string.
    pub fn from_settings(settings: &PluginSettings) -> SpiResult<Self> {
        if settings.id.trim().is_empty() {
            return Err(SpiError::config("plugin id is required and must be non-empty"));
        }

        for dep in settings
            .connector_dependencies
            .iter()
            .chain(&settings.attribute_dependencies)
        {
            if dep.trim().is_empty() {
                return Err(SpiError::config(format!(
                    "plugin {}: dependency ids must be non-empty",
                    settings.id
                )));
            }
        }

        if let Some(failover) = &settings.failover {
            if failover.trim().is_empty() {
                return Err(SpiError::config(format!(
                    "plugin {}: failover id must be non-empty",
                    settings.id
                )));
            }
        }

        if settings.connector_dependencies.is_empty()
            && settings.attribute_dependencies.is_empty()
        {
            tracing::warn!(
                plugin_id = %settings.id,
                "plugin declares no dependencies"
            );
        }

        Ok(Self {
            id: settings.id.clone(),
            cache_ttl: Duration::from_secs(settings.cache_ttl_secs),
            propagate_errors: settings.propagate_errors,
            connector_dependencies: settings.connector_dependencies.clone(),
            attribute_dependencies: settings.attribute_dependencies.clone(),
            failover: settings.failover.clone(),
        })
    }

    /// Returns the plugin id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the cache lifetime. Zero means never cache.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Returns whether failures propagate to dependents.
    #[must_use]
    pub const fn propagate_errors(&self) -> bool {
        self.propagate_errors
    }

    /// Returns the connector dependency ids in declaration order.
    #[must_use]
    pub fn connector_dependencies(&self) -> &[String] {
        &self.connector_dependencies
    }

    /// Returns the attribute dependency ids in declaration order.
    #[must_use]
    pub fn attribute_dependencies(&self) -> &[String] {
        &self.attribute_dependencies
    }

    /// Returns the failover connector id, if declared.
    #[must_use]
    pub fn failover(&self) -> Option<&str> {
        self.failover.as_deref()
    }

    /// Iterates over all dependency ids, connectors first.
    pub fn all_dependencies(&self) -> impl Iterator<Item = &str> {
        self.connector_dependencies
            .iter()
            .chain(&self.attribute_dependencies)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_rejected() {
        let settings = PluginSettings::new("  ", "static");
        let result = PluginConfig::from_settings(&settings);
        assert!(matches!(result, Err(SpiError::Configuration(_))));
    }

    #[test]
    fn empty_dependency_id_is_rejected() {
        let settings = PluginSettings::new("mail", "simple").with_connector_dependency("");
        let result = PluginConfig::from_settings(&settings);
        assert!(matches!(result, Err(SpiError::Configuration(_))));
    }

    #[test]
    fn defaults_are_no_cache_and_propagate() {
        let settings = PluginSettings::new("mail", "simple");
        let config = PluginConfig::from_settings(&settings).unwrap();

        assert_eq!(config.cache_ttl(), Duration::ZERO);
        assert!(config.propagate_errors());
        assert!(config.failover().is_none());
    }

    #[test]
    fn dependency_order_is_preserved() {
        let settings = PluginSettings::new("combined", "simple")
            .with_connector_dependency("dir")
            .with_connector_dependency("db")
            .with_attribute_dependency("upstream");
        let config = PluginConfig::from_settings(&settings).unwrap();

        let deps: Vec<_> = config.all_dependencies().collect();
        assert_eq!(deps, ["dir", "db", "upstream"]);
    }
}
