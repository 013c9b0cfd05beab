//! Simple attribute definition.

use std::sync::Arc;

use fedid_model::{
    AttributeValue, Base64ValueEncoder, ResolutionContext, ResolverAttribute,
};
use fedid_spi::{
    AttributeDefinition, Dependencies, PluginConfig, PluginSettings, SpiError, SpiResult,
};
use serde::{Deserialize, Serialize};

/// Options for the simple definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleOptions {
    /// Name of the source attribute in upstream results. Defaults to the
    /// definition's own id.
    #[serde(default)]
    pub source_name: Option<String>,

    /// Drop empty-string values.
    #[serde(default)]
    pub ignore_empty: bool,

    /// Lowercase text values.
    #[serde(default)]
    pub lowercase: bool,

    /// Scope appended to unscoped values (`value` becomes `value@scope`;
    /// already-scoped values pass through).
    #[serde(default)]
    pub smart_scope: Option<String>,

    /// Named value-formatting strategy attached to the attribute.
    /// Currently `base64` for byte-valued sources. Mutually exclusive
    /// with `smart_scope`.
    #[serde(default)]
    pub encoder: Option<String>,
}

/// Collects upstream values into an order-preserving de-duplicated set,
/// with optional normalization and scoping.
#[derive(Debug)]
pub struct SimpleAttributeDefinition {
    config: PluginConfig,
    options: SimpleOptions,
}

impl SimpleAttributeDefinition {
    /// Builds the definition from settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid common settings, an
    /// unknown encoder name, or `smart_scope` combined with `encoder`.
    pub fn from_settings(settings: &PluginSettings) -> SpiResult<Self> {
        let config = PluginConfig::from_settings(settings)?;
        let options: SimpleOptions = settings.typed_options()?;

        if options.smart_scope.is_some() && options.encoder.is_some() {
            return Err(SpiError::config(format!(
                "plugin {}: smart_scope and encoder are mutually exclusive",
                config.id()
            )));
        }
        if let Some(encoder) = &options.encoder {
            if encoder != "base64" {
                return Err(SpiError::config(format!(
                    "plugin {}: unknown encoder {encoder}",
                    config.id()
                )));
            }
        }

        Ok(Self { config, options })
    }

    fn source_name(&self) -> &str {
        self.options
            .source_name
            .as_deref()
            .unwrap_or_else(|| self.config.id())
    }
}

impl AttributeDefinition for SimpleAttributeDefinition {
    fn config(&self) -> &PluginConfig {
        &self.config
    }

    fn resolve(
        &self,
        attribute: &mut ResolverAttribute,
        _ctx: &ResolutionContext,
        deps: &Dependencies,
    ) -> SpiResult<()> {
        if self.options.encoder.as_deref() == Some("base64") {
            attribute.set_encoder(Arc::new(Base64ValueEncoder));
        }

        for value in deps.collect_values(&self.config, self.source_name()) {
            if self.options.ignore_empty && value.is_empty() {
                continue;
            }
            let value = match value {
                AttributeValue::Text(text) => {
                    let text = if self.options.lowercase {
                        text.to_lowercase()
                    } else {
                        text
                    };
                    let text = match &self.options.smart_scope {
                        Some(scope) if !text.contains('@') => format!("{text}@{scope}"),
                        _ => text,
                    };
                    AttributeValue::Text(text)
                }
                bytes @ AttributeValue::Bytes(_) => bytes,
            };
            attribute.add_value(value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedid_model::AttributeSet;

    fn definition(options: SimpleOptions) -> SimpleAttributeDefinition {
        let settings = PluginSettings::new("affiliation", "simple")
            .with_connector_dependency("dir")
            .with_options(&options);
        SimpleAttributeDefinition::from_settings(&settings).unwrap()
    }

    fn deps_with(values: &[&str]) -> Dependencies {
        let mut set = AttributeSet::new();
        for v in values {
            set.add("affiliation", (*v).into());
        }
        let mut deps = Dependencies::new();
        deps.insert_connector_result("dir", set);
        deps
    }

    fn resolve(definition: &SimpleAttributeDefinition, deps: &Dependencies) -> Vec<String> {
        let mut attr = ResolverAttribute::new("affiliation");
        definition
            .resolve(&mut attr, &ResolutionContext::new("jdoe"), deps)
            .unwrap();
        attr.values()
            .iter()
            .filter_map(|v| v.as_text().map(str::to_string))
            .collect()
    }

    #[test]
    fn smart_scope_appends_only_when_unscoped() {
        let definition = definition(SimpleOptions {
            smart_scope: Some("example.edu".to_string()),
            ..SimpleOptions::default()
        });
        let values = resolve(&definition, &deps_with(&["bob", "bob@other.edu"]));
        assert_eq!(values, ["bob@example.edu", "bob@other.edu"]);
    }

    #[test]
    fn smart_scope_is_idempotent() {
        let definition = definition(SimpleOptions {
            smart_scope: Some("example.edu".to_string()),
            ..SimpleOptions::default()
        });
        let once = resolve(&definition, &deps_with(&["bob"]));
        let twice = resolve(&definition, &deps_with(&[&once[0]]));
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_values_are_stripped_when_configured() {
        let definition = definition(SimpleOptions {
            ignore_empty: true,
            ..SimpleOptions::default()
        });
        let values = resolve(&definition, &deps_with(&["", "staff"]));
        assert_eq!(values, ["staff"]);
    }

    #[test]
    fn lowercasing_and_dedup_combine() {
        let definition = definition(SimpleOptions {
            lowercase: true,
            ..SimpleOptions::default()
        });
        let values = resolve(&definition, &deps_with(&["Staff", "staff", "MEMBER"]));
        assert_eq!(values, ["staff", "member"]);
    }

    #[test]
    fn smart_scope_with_encoder_is_rejected() {
        let settings = PluginSettings::new("affiliation", "simple").with_options(&SimpleOptions {
            smart_scope: Some("example.edu".to_string()),
            encoder: Some("base64".to_string()),
            ..SimpleOptions::default()
        });
        assert!(SimpleAttributeDefinition::from_settings(&settings).is_err());
    }
}
