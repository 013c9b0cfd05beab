//! Built-in data connectors.
//!
//! Network-backed connectors (SQL, LDAP) live in their own crates; the
//! static connector here serves fixed attribute values from configuration
//! and doubles as the usual failover target.

use std::collections::HashMap;

use async_trait::async_trait;
use fedid_model::{AttributeSet, AttributeValue, ResolutionContext};
use fedid_spi::{
    DataConnector, Dependencies, PluginConfig, PluginRegistry, PluginSettings, SpiResult,
    PRINCIPAL_TOKEN,
};
use serde::{Deserialize, Serialize};

/// Options for the static connector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticOptions {
    /// Attribute name to template values. `%PRINCIPAL%` in a value is
    /// replaced with the principal name at resolve time.
    #[serde(default)]
    pub attributes: HashMap<String, Vec<String>>,
}

/// Serves immutable template attributes parsed at configuration time.
#[derive(Debug)]
pub struct StaticDataConnector {
    config: PluginConfig,
    attributes: HashMap<String, Vec<String>>,
}

impl StaticDataConnector {
    /// Builds the connector from settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid common settings or
    /// malformed options.
    pub fn from_settings(settings: &PluginSettings) -> SpiResult<Self> {
        let config = PluginConfig::from_settings(settings)?;
        let options: StaticOptions = settings.typed_options()?;
        Ok(Self {
            config,
            attributes: options.attributes,
        })
    }
}

#[async_trait]
impl DataConnector for StaticDataConnector {
    fn config(&self) -> &PluginConfig {
        &self.config
    }

    async fn resolve(
        &self,
        ctx: &ResolutionContext,
        _deps: &Dependencies,
    ) -> SpiResult<AttributeSet> {
        let mut set = AttributeSet::new();
        for (name, templates) in &self.attributes {
            let values = templates
                .iter()
                .map(|t| AttributeValue::text(t.replace(PRINCIPAL_TOKEN, &ctx.principal)))
                .collect();
            set.insert(name.clone(), values);
        }
        Ok(set)
    }
}

/// Registers the built-in connector types.
pub fn register_builtin_connectors(registry: &PluginRegistry) {
    registry.register_connector("static", |settings| {
        Ok(Box::new(StaticDataConnector::from_settings(settings)?) as Box<dyn DataConnector>)
    });
}
