//! Formatted attribute definition.

use chrono::NaiveDateTime;
use fedid_model::{ResolutionContext, ResolverAttribute};
use fedid_spi::{
    AttributeDefinition, Dependencies, PluginConfig, PluginSettings, SpiError, SpiResult,
};
use serde::{Deserialize, Serialize};

/// Options for the formatted definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormattedOptions {
    /// Name of the source attribute. Defaults to the definition's id.
    #[serde(default)]
    pub source_name: Option<String>,

    /// strftime-style format the source values are parsed with.
    pub source_format: String,

    /// strftime-style format the values are re-rendered with.
    pub target_format: String,
}

/// Parses each source value as a timestamp in one format and re-renders
/// it in another. Values that fail to parse are dropped, not fatal.
#[derive(Debug)]
pub struct FormattedAttributeDefinition {
    config: PluginConfig,
    source_name: Option<String>,
    source_format: String,
    target_format: String,
}

impl FormattedAttributeDefinition {
    /// Builds the definition from settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when either format is empty or
    /// contains an invalid strftime specifier.
    pub fn from_settings(settings: &PluginSettings) -> SpiResult<Self> {
        let config = PluginConfig::from_settings(settings)?;
        let options: FormattedOptions = settings.typed_options()?;

        if options.source_format.is_empty() || options.target_format.is_empty() {
            return Err(SpiError::config(format!(
                "plugin {}: source_format and target_format are required",
                config.id()
            )));
        }
        for format in [&options.source_format, &options.target_format] {
            if chrono::format::StrftimeItems::new(format)
                .any(|item| matches!(item, chrono::format::Item::Error))
            {
                return Err(SpiError::config(format!(
                    "plugin {}: invalid format string {format}",
                    config.id()
                )));
            }
        }

        Ok(Self {
            config,
            source_name: options.source_name,
            source_format: options.source_format,
            target_format: options.target_format,
        })
    }

    fn source_name(&self) -> &str {
        self.source_name.as_deref().unwrap_or_else(|| self.config.id())
    }
}

impl AttributeDefinition for FormattedAttributeDefinition {
    fn config(&self) -> &PluginConfig {
        &self.config
    }

    fn resolve(
        &self,
        attribute: &mut ResolverAttribute,
        _ctx: &ResolutionContext,
        deps: &Dependencies,
    ) -> SpiResult<()> {
        for value in deps.collect_values(&self.config, self.source_name()) {
            let Some(text) = value.as_text() else {
                continue;
            };
            match NaiveDateTime::parse_from_str(text, &self.source_format) {
                Ok(parsed) => {
                    attribute.add_value(parsed.format(&self.target_format).to_string().into());
                }
                Err(e) => {
                    tracing::debug!(
                        plugin_id = %self.config.id(),
                        error = %e,
                        "dropping value that failed to parse"
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedid_model::AttributeSet;

    fn definition() -> FormattedAttributeDefinition {
        let settings = PluginSettings::new("accountCreated", "formatted")
            .with_connector_dependency("db")
            .with_options(&FormattedOptions {
                source_name: None,
                source_format: "%Y%m%d%H%M%S".to_string(),
                target_format: "%Y-%m-%d".to_string(),
            });
        FormattedAttributeDefinition::from_settings(&settings).unwrap()
    }

    fn resolve(values: &[&str]) -> Vec<String> {
        let mut set = AttributeSet::new();
        for v in values {
            set.add("accountCreated", (*v).into());
        }
        let mut deps = Dependencies::new();
        deps.insert_connector_result("db", set);

        let mut attr = ResolverAttribute::new("accountCreated");
        definition()
            .resolve(&mut attr, &ResolutionContext::new("jdoe"), &deps)
            .unwrap();
        attr.values()
            .iter()
            .filter_map(|v| v.as_text().map(str::to_string))
            .collect()
    }

    #[test]
    fn values_are_reformatted() {
        assert_eq!(resolve(&["20240131123000"]), ["2024-01-31"]);
    }

    #[test]
    fn unparseable_values_are_dropped_not_fatal() {
        assert_eq!(resolve(&["not-a-date", "20240131123000"]), ["2024-01-31"]);
    }

    #[test]
    fn invalid_format_specifier_is_rejected() {
        let settings = PluginSettings::new("x", "formatted").with_options(&FormattedOptions {
            source_name: None,
            source_format: "%Y%m%d".to_string(),
            target_format: "%Q".to_string(),
        });
        assert!(FormattedAttributeDefinition::from_settings(&settings).is_err());
    }

    #[test]
    fn missing_formats_are_rejected() {
        let settings = PluginSettings::new("x", "formatted").with_options(&FormattedOptions {
            source_name: None,
            source_format: String::new(),
            target_format: "%Y".to_string(),
        });
        assert!(FormattedAttributeDefinition::from_settings(&settings).is_err());
    }
}
