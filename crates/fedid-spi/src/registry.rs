//! Plugin factory registry.
//!
//! The registry maps plugin type names to factory functions. Resolver
//! configuration names a `type` per plugin; construction routes through
//! here. Registering a factory under a new name is all it takes to add a
//! custom connector or definition.

use std::sync::Arc;

use dashmap::DashMap;

use crate::connector::DataConnector;
use crate::definition::AttributeDefinition;
use crate::error::{SpiError, SpiResult};
use crate::plugin::PluginSettings;

/// Factory for data connectors.
pub type ConnectorFactory =
    Arc<dyn Fn(&PluginSettings) -> SpiResult<Box<dyn DataConnector>> + Send + Sync>;

/// Factory for attribute definitions.
pub type DefinitionFactory =
    Arc<dyn Fn(&PluginSettings) -> SpiResult<Box<dyn AttributeDefinition>> + Send + Sync>;

/// Registry of plugin factories keyed by type name.
#[derive(Default)]
pub struct PluginRegistry {
    connectors: DashMap<&'static str, ConnectorFactory>,
    definitions: DashMap<&'static str, DefinitionFactory>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("connector_types", &self.connector_types())
            .field("definition_types", &self.definition_types())
            .finish()
    }
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connector factory under a type name.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register_connector<F>(&self, type_name: &'static str, factory: F)
    where
        F: Fn(&PluginSettings) -> SpiResult<Box<dyn DataConnector>> + Send + Sync + 'static,
    {
        self.connectors.insert(type_name, Arc::new(factory));
    }

    /// Registers a definition factory under a type name.
    pub fn register_definition<F>(&self, type_name: &'static str, factory: F)
    where
        F: Fn(&PluginSettings) -> SpiResult<Box<dyn AttributeDefinition>> + Send + Sync + 'static,
    {
        self.definitions.insert(type_name, Arc::new(factory));
    }

    /// Creates a connector from its settings.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPluginType` if no connector factory matches the
    /// settings' type name, or the factory's own configuration error.
    pub fn create_connector(&self, settings: &PluginSettings) -> SpiResult<Box<dyn DataConnector>> {
        let factory = self
            .connectors
            .get(settings.type_name.as_str())
            .ok_or_else(|| SpiError::UnknownPluginType(settings.type_name.clone()))?;
        factory(settings)
    }

    /// Creates an attribute definition from its settings.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPluginType` if no definition factory matches the
    /// settings' type name, or the factory's own configuration error.
    pub fn create_definition(
        &self,
        settings: &PluginSettings,
    ) -> SpiResult<Box<dyn AttributeDefinition>> {
        let factory = self
            .definitions
            .get(settings.type_name.as_str())
            .ok_or_else(|| SpiError::UnknownPluginType(settings.type_name.clone()))?;
        factory(settings)
    }

    /// Returns whether a connector type is registered.
    #[must_use]
    pub fn has_connector_type(&self, type_name: &str) -> bool {
        self.connectors.contains_key(type_name)
    }

    /// Returns whether a definition type is registered.
    #[must_use]
    pub fn has_definition_type(&self, type_name: &str) -> bool {
        self.definitions.contains_key(type_name)
    }

    /// Lists registered connector type names.
    #[must_use]
    pub fn connector_types(&self) -> Vec<&'static str> {
        self.connectors.iter().map(|e| *e.key()).collect()
    }

    /// Lists registered definition type names.
    #[must_use]
    pub fn definition_types(&self) -> Vec<&'static str> {
        self.definitions.iter().map(|e| *e.key()).collect()
    }
}
