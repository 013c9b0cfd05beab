//! Scriptlet attribute definition.
//!
//! Script evaluation itself is an external concern: the definition hands
//! the resolution state to a [`ScriptHost`] with a fixed binding contract
//! and adds whatever values come back.

use std::fmt::Debug;
use std::sync::Arc;

use fedid_model::{AttributeValue, ResolutionContext, ResolverAttribute};
use fedid_spi::{
    AttributeDefinition, Dependencies, PluginConfig, PluginRegistry, PluginSettings, SpiError,
    SpiResult,
};
use serde::{Deserialize, Serialize};

/// The resolution state exposed to a script.
#[derive(Debug)]
pub struct ScriptBindings<'a> {
    /// The attribute being resolved (read-only; returned values are added
    /// by the definition, not the script).
    pub attribute: &'a ResolverAttribute,
    /// The resolution context (principal, requester, responder).
    pub ctx: &'a ResolutionContext,
    /// Upstream results for the definition's declared dependencies.
    pub dependencies: &'a Dependencies,
}

/// Evaluates externally supplied script code against resolution state.
pub trait ScriptHost: Send + Sync + Debug {
    /// Runs `script` with the given bindings, returning the values to add.
    ///
    /// # Errors
    ///
    /// Returns a resolution error when the script fails.
    fn evaluate(
        &self,
        script: &str,
        bindings: ScriptBindings<'_>,
    ) -> SpiResult<Vec<AttributeValue>>;
}

/// Options for the scriptlet definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptletOptions {
    /// Script source handed to the host verbatim.
    pub script: String,
}

/// Delegates attribute derivation to a script host.
#[derive(Debug)]
pub struct ScriptletAttributeDefinition {
    config: PluginConfig,
    script: String,
    host: Arc<dyn ScriptHost>,
}

impl ScriptletAttributeDefinition {
    /// Builds the definition from settings and a host.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid common settings or an
    /// empty script.
    pub fn from_settings(settings: &PluginSettings, host: Arc<dyn ScriptHost>) -> SpiResult<Self> {
        let config = PluginConfig::from_settings(settings)?;
        let options: ScriptletOptions = settings.typed_options()?;

        if options.script.trim().is_empty() {
            return Err(SpiError::config(format!(
                "plugin {}: script is required",
                config.id()
            )));
        }

        Ok(Self {
            config,
            script: options.script,
            host,
        })
    }
}

impl AttributeDefinition for ScriptletAttributeDefinition {
    fn config(&self) -> &PluginConfig {
        &self.config
    }

    fn resolve(
        &self,
        attribute: &mut ResolverAttribute,
        ctx: &ResolutionContext,
        deps: &Dependencies,
    ) -> SpiResult<()> {
        let bindings = ScriptBindings {
            attribute,
            ctx,
            dependencies: deps,
        };
        let values = self.host.evaluate(&self.script, bindings)?;
        for value in values {
            attribute.add_value(value);
        }
        Ok(())
    }
}

/// Registers the `scriptlet` definition type backed by the given host.
pub fn register_scriptlet_definition(registry: &PluginRegistry, host: Arc<dyn ScriptHost>) {
    registry.register_definition("scriptlet", move |settings| {
        Ok(
            Box::new(ScriptletAttributeDefinition::from_settings(settings, host.clone())?)
                as Box<dyn AttributeDefinition>,
        )
    });
}
