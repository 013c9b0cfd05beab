//! Regular-expression attribute definition.

use fedid_model::{ResolutionContext, ResolverAttribute};
use fedid_spi::{
    AttributeDefinition, Dependencies, PluginConfig, PluginSettings, SpiError, SpiResult,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Options for the regex definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegexOptions {
    /// Name of the source attribute. Defaults to the definition's id.
    #[serde(default)]
    pub source_name: Option<String>,

    /// Pattern applied to each source value.
    pub pattern: String,

    /// Replacement, with `$1`-style capture references.
    #[serde(default)]
    pub replacement: String,

    /// When false (the default), a value must match the pattern in full
    /// to be kept; non-matching values are dropped. When true, every
    /// occurrence inside the value is replaced and the value is kept.
    #[serde(default)]
    pub partial_match: bool,
}

/// Applies one compiled pattern + replacement to each source value.
#[derive(Debug)]
pub struct RegexAttributeDefinition {
    config: PluginConfig,
    source_name: Option<String>,
    /// Pattern anchored to the full value, used in full-match mode.
    full: Regex,
    /// Unanchored pattern, used in partial-match mode.
    partial: Regex,
    replacement: String,
    partial_match: bool,
}

impl RegexAttributeDefinition {
    /// Builds the definition, compiling the pattern up front.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty or invalid pattern.
    pub fn from_settings(settings: &PluginSettings) -> SpiResult<Self> {
        let config = PluginConfig::from_settings(settings)?;
        let options: RegexOptions = settings.typed_options()?;

        if options.pattern.is_empty() {
            return Err(SpiError::config(format!(
                "plugin {}: pattern is required",
                config.id()
            )));
        }

        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                SpiError::config(format!(
                    "plugin {}: invalid pattern: {e}",
                    config.id()
                ))
            })
        };
        let full = compile(&format!(r"\A(?:{})\z", options.pattern))?;
        let partial = compile(&options.pattern)?;

        Ok(Self {
            config,
            source_name: options.source_name,
            full,
            partial,
            replacement: options.replacement,
            partial_match: options.partial_match,
        })
    }

    fn source_name(&self) -> &str {
        self.source_name.as_deref().unwrap_or_else(|| self.config.id())
    }
}

impl AttributeDefinition for RegexAttributeDefinition {
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
                tracing::debug!(
                    plugin_id = %self.config.id(),
                    "skipping non-text source value in regex definition"
                );
                continue;
            };

            if self.partial_match {
                let replaced = self.partial.replace_all(text, self.replacement.as_str());
                attribute.add_value(replaced.into_owned().into());
            } else if self.full.is_match(text) {
                let replaced = self.full.replace(text, self.replacement.as_str());
                attribute.add_value(replaced.into_owned().into());
            } else {
                tracing::debug!(
                    plugin_id = %self.config.id(),
                    "dropping value that does not fully match pattern"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedid_model::AttributeSet;

    fn definition(options: RegexOptions) -> RegexAttributeDefinition {
        let settings = PluginSettings::new("uid", "regex")
            .with_connector_dependency("dir")
            .with_options(&options);
        RegexAttributeDefinition::from_settings(&settings).unwrap()
    }

    fn resolve(definition: &RegexAttributeDefinition, values: &[&str]) -> Vec<String> {
        let mut set = AttributeSet::new();
        for v in values {
            set.add("uid", (*v).into());
        }
        let mut deps = Dependencies::new();
        deps.insert_connector_result("dir", set);

        let mut attr = ResolverAttribute::new("uid");
        definition
            .resolve(&mut attr, &ResolutionContext::new("jdoe"), &deps)
            .unwrap();
        attr.values()
            .iter()
            .filter_map(|v| v.as_text().map(str::to_string))
            .collect()
    }

    #[test]
    fn full_match_drops_non_matching_values_without_error() {
        let definition = definition(RegexOptions {
            pattern: r"\d+".to_string(),
            replacement: "$0".to_string(),
            ..RegexOptions::default()
        });

        // "abc" does not match ^\d+$ - dropped, no error raised.
        let values = resolve(&definition, &["abc", "12345"]);
        assert_eq!(values, ["12345"]);
    }

    #[test]
    fn full_match_applies_capture_replacement() {
        let definition = definition(RegexOptions {
            pattern: r"(\w+)@example\.edu".to_string(),
            replacement: "$1".to_string(),
            ..RegexOptions::default()
        });
        let values = resolve(&definition, &["jdoe@example.edu"]);
        assert_eq!(values, ["jdoe"]);
    }

    #[test]
    fn partial_match_keeps_values_and_rewrites_occurrences() {
        let definition = definition(RegexOptions {
            pattern: r"-".to_string(),
            replacement: "_".to_string(),
            partial_match: true,
            ..RegexOptions::default()
        });
        let values = resolve(&definition, &["a-b-c", "plain"]);
        assert_eq!(values, ["a_b_c", "plain"]);
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        let settings = PluginSettings::new("uid", "regex").with_options(&RegexOptions {
            pattern: "(".to_string(),
            ..RegexOptions::default()
        });
        assert!(RegexAttributeDefinition::from_settings(&settings).is_err());
    }
}
