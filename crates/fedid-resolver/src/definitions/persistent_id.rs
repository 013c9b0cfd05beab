//! Persistent pseudonymous identifier definition.

use std::sync::Arc;

use base64::Engine;
use fedid_crypto::{sha1_legacy, Salt};
use fedid_model::{ResolutionContext, ResolverAttribute, ScopedStringEncoder};
use fedid_spi::{
    AttributeDefinition, Dependencies, PluginConfig, PluginSettings, SpiError, SpiResult,
};
use serde::{Deserialize, Serialize};

/// Options for the persistent-id definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistentIdOptions {
    /// Source attribute providing the local identifier. Defaults to the
    /// definition's id.
    #[serde(default)]
    pub source_name: Option<String>,

    /// Scope attached to generated identifiers.
    pub scope: String,

    /// Inline salt value. Exactly one of `salt` and `salt_file` must be
    /// set.
    #[serde(default)]
    pub salt: Option<String>,

    /// Path to a secret file holding the salt.
    #[serde(default)]
    pub salt_file: Option<String>,
}

/// Generates a salted, scoped, pseudonymous identifier per requester.
///
/// The identifier is `base64(sha1(requester + "!" + localId + "!" + salt))`,
/// a format fixed by relying parties that already consume it. An
/// unauthenticated requester gets no identifier: correlation handles must
/// never be handed to anonymous peers.
#[derive(Debug)]
pub struct PersistentIdAttributeDefinition {
    config: PluginConfig,
    source_name: Option<String>,
    scope: String,
    salt: Salt,
}

impl PersistentIdAttributeDefinition {
    /// Builds the definition, loading the salt.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the scope is empty, the salt is
    /// missing or doubly specified, or the secret file cannot be read.
    pub fn from_settings(settings: &PluginSettings) -> SpiResult<Self> {
        let config = PluginConfig::from_settings(settings)?;
        let options: PersistentIdOptions = settings.typed_options()?;

        if options.scope.is_empty() {
            return Err(SpiError::config(format!(
                "plugin {}: scope is required",
                config.id()
            )));
        }

        let salt = match (&options.salt, &options.salt_file) {
            (Some(inline), None) => Salt::from_inline(inline),
            (None, Some(path)) => Salt::from_file(path),
            _ => {
                return Err(SpiError::config(format!(
                    "plugin {}: exactly one of salt and salt_file is required",
                    config.id()
                )))
            }
        }
        .map_err(|e| SpiError::config(format!("plugin {}: {e}", config.id())))?;

        Ok(Self {
            config,
            source_name: options.source_name,
            scope: options.scope,
            salt,
        })
    }

    fn source_name(&self) -> &str {
        self.source_name.as_deref().unwrap_or_else(|| self.config.id())
    }

    fn compute(&self, requester: &str, local_id: &str) -> String {
        let mut data = Vec::with_capacity(requester.len() + local_id.len() + 2 + self.salt.as_bytes().len());
        data.extend_from_slice(requester.as_bytes());
        data.push(b'!');
        data.extend_from_slice(local_id.as_bytes());
        data.push(b'!');
        data.extend_from_slice(self.salt.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(sha1_legacy(&data))
    }
}

impl AttributeDefinition for PersistentIdAttributeDefinition {
    fn config(&self) -> &PluginConfig {
        &self.config
    }

    fn resolve(
        &self,
        attribute: &mut ResolverAttribute,
        ctx: &ResolutionContext,
        deps: &Dependencies,
    ) -> SpiResult<()> {
        attribute.set_encoder(Arc::new(ScopedStringEncoder::new(self.scope.clone())));

        let Some(requester) = ctx.requester() else {
            tracing::warn!(
                plugin_id = %self.config.id(),
                principal = %ctx.principal,
                "refusing to generate persistent ID for unauthenticated requester"
            );
            return Ok(());
        };

        let values = deps.collect_values(&self.config, self.source_name());
        let Some(local_id) = values.first().and_then(|v| v.as_text()) else {
            return Err(SpiError::resolution(
                self.config.id(),
                "no local identifier available from dependencies",
            ));
        };

        attribute.add_value(self.compute(requester, local_id).into());
        Ok(())
    }
}
