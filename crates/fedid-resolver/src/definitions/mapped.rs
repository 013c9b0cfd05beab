//! Mapped attribute definition.

use fedid_model::{ResolutionContext, ResolverAttribute};
use fedid_spi::{
    AttributeDefinition, Dependencies, PluginConfig, PluginSettings, SpiError, SpiResult,
};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Default-value sentinel meaning "echo the source value unchanged".
const ECHO_SENTINEL: &str = "&";

/// One mapping entry: any matching key contributes `value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueMapEntry {
    /// Mapped output value.
    pub value: String,
    /// Keys matched against source values. A key containing regex
    /// metacharacters is treated as a pattern unless `regex` forces all
    /// keys to be patterns.
    pub keys: Vec<String>,
}

/// Options for the mapped definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappedOptions {
    /// Name of the source attribute. Defaults to the definition's id.
    #[serde(default)]
    pub source_name: Option<String>,

    /// Mapping entries.
    #[serde(default)]
    pub value_maps: Vec<ValueMapEntry>,

    /// Treat every key as a regex pattern.
    #[serde(default)]
    pub regex: bool,

    /// Match keys case-insensitively.
    #[serde(default)]
    pub case_insensitive: bool,

    /// Fallback when no key matches: a literal value, or `&` to echo the
    /// source value. With no default, unmatched values are dropped.
    #[serde(default)]
    pub default_value: Option<String>,
}

enum CompiledKey {
    Exact(String),
    Pattern(Regex),
}

struct Mapping {
    key: CompiledKey,
    value: String,
}

/// Many-to-many value remapper over exact-string and regex keys.
pub struct MappedAttributeDefinition {
    config: PluginConfig,
    source_name: Option<String>,
    mappings: Vec<Mapping>,
    case_insensitive: bool,
    default_value: Option<String>,
}

impl std::fmt::Debug for MappedAttributeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedAttributeDefinition")
            .field("config", &self.config)
            .field("mappings", &self.mappings.len())
            .finish_non_exhaustive()
    }
}

fn looks_like_pattern(key: &str) -> bool {
    key.chars()
        .any(|c| matches!(c, '.' | '*' | '+' | '?' | '[' | ']' | '(' | ')' | '{' | '}' | '|' | '^' | '$' | '\\'))
}

impl MappedAttributeDefinition {
    /// Builds the definition, compiling regex keys up front.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid pattern or an empty
    /// mapping table.
    pub fn from_settings(settings: &PluginSettings) -> SpiResult<Self> {
        let config = PluginConfig::from_settings(settings)?;
        let options: MappedOptions = settings.typed_options()?;

        if options.value_maps.is_empty() {
            return Err(SpiError::config(format!(
                "plugin {}: mapped requires at least one value map",
                config.id()
            )));
        }

        let mut mappings = Vec::new();
        for entry in &options.value_maps {
            for key in &entry.keys {
                let compiled = if options.regex || looks_like_pattern(key) {
                    let pattern = RegexBuilder::new(&format!(r"\A(?:{key})\z"))
                        .case_insensitive(options.case_insensitive)
                        .build()
                        .map_err(|e| {
                            SpiError::config(format!(
                                "plugin {}: invalid key pattern {key}: {e}",
                                config.id()
                            ))
                        })?;
                    CompiledKey::Pattern(pattern)
                } else {
                    CompiledKey::Exact(key.clone())
                };
                mappings.push(Mapping {
                    key: compiled,
                    value: entry.value.clone(),
                });
            }
        }

        Ok(Self {
            config,
            source_name: options.source_name,
            mappings,
            case_insensitive: options.case_insensitive,
            default_value: options.default_value,
        })
    }

    fn source_name(&self) -> &str {
        self.source_name.as_deref().unwrap_or_else(|| self.config.id())
    }

    fn matches(&self, key: &CompiledKey, value: &str) -> bool {
        match key {
            CompiledKey::Exact(k) if self.case_insensitive => k.eq_ignore_ascii_case(value),
            CompiledKey::Exact(k) => k == value,
            CompiledKey::Pattern(re) => re.is_match(value),
        }
    }
}

impl AttributeDefinition for MappedAttributeDefinition {
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
                    "skipping non-text source value in mapped definition"
                );
                continue;
            };

            let mut matched = false;
            for mapping in &self.mappings {
                if self.matches(&mapping.key, text) {
                    matched = true;
                    attribute.add_value(mapping.value.clone().into());
                }
            }

            if !matched {
                match self.default_value.as_deref() {
                    Some(ECHO_SENTINEL) => {
                        attribute.add_value(text.into());
                    }
                    Some(default) => {
                        attribute.add_value(default.into());
                    }
                    None => {
                        tracing::debug!(
                            plugin_id = %self.config.id(),
                            "dropping unmatched source value"
                        );
                    }
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

    fn definition(options: MappedOptions) -> MappedAttributeDefinition {
        let settings = PluginSettings::new("eduPersonAffiliation", "mapped")
            .with_connector_dependency("dir")
            .with_options(&options);
        MappedAttributeDefinition::from_settings(&settings).unwrap()
    }

    fn resolve(definition: &MappedAttributeDefinition, values: &[&str]) -> Vec<String> {
        let mut set = AttributeSet::new();
        for v in values {
            set.add("eduPersonAffiliation", (*v).into());
        }
        let mut deps = Dependencies::new();
        deps.insert_connector_result("dir", set);

        let mut attr = ResolverAttribute::new("eduPersonAffiliation");
        definition
            .resolve(&mut attr, &ResolutionContext::new("jdoe"), &deps)
            .unwrap();
        attr.values()
            .iter()
            .filter_map(|v| v.as_text().map(str::to_string))
            .collect()
    }

    fn affiliation_maps() -> Vec<ValueMapEntry> {
        vec![
            ValueMapEntry {
                value: "member".to_string(),
                keys: vec!["faculty".to_string(), "staff".to_string(), "student".to_string()],
            },
            ValueMapEntry {
                value: "faculty".to_string(),
                keys: vec!["fac.*".to_string()],
            },
        ]
    }

    #[test]
    fn exact_and_regex_keys_both_contribute() {
        let definition = definition(MappedOptions {
            value_maps: affiliation_maps(),
            ..MappedOptions::default()
        });

        // "faculty" hits the exact key of "member" and the fac.* pattern
        // of "faculty".
        let values = resolve(&definition, &["faculty"]);
        assert_eq!(values, ["member", "faculty"]);
    }

    #[test]
    fn echo_default_passes_value_through() {
        let definition = definition(MappedOptions {
            value_maps: affiliation_maps(),
            default_value: Some("&".to_string()),
            ..MappedOptions::default()
        });
        let values = resolve(&definition, &["visitor"]);
        assert_eq!(values, ["visitor"]);
    }

    #[test]
    fn no_default_drops_unmatched_values() {
        let definition = definition(MappedOptions {
            value_maps: affiliation_maps(),
            ..MappedOptions::default()
        });
        assert!(resolve(&definition, &["visitor"]).is_empty());
    }

    #[test]
    fn literal_default_is_substituted() {
        let definition = definition(MappedOptions {
            value_maps: affiliation_maps(),
            default_value: Some("affiliate".to_string()),
            ..MappedOptions::default()
        });
        assert_eq!(resolve(&definition, &["visitor"]), ["affiliate"]);
    }

    #[test]
    fn case_insensitive_matching() {
        let definition = definition(MappedOptions {
            value_maps: affiliation_maps(),
            case_insensitive: true,
            ..MappedOptions::default()
        });
        let values = resolve(&definition, &["STAFF"]);
        assert_eq!(values, ["member"]);
    }

    #[test]
    fn regex_keys_require_full_match() {
        let definition = definition(MappedOptions {
            value_maps: affiliation_maps(),
            ..MappedOptions::default()
        });
        // "prefac" contains "fac" but fac.* must match the whole value.
        assert!(resolve(&definition, &["prefac"]).is_empty());
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        let settings = PluginSettings::new("x", "mapped").with_options(&MappedOptions {
            value_maps: vec![ValueMapEntry {
                value: "v".to_string(),
                keys: vec!["(".to_string()],
            }],
            ..MappedOptions::default()
        });
        assert!(MappedAttributeDefinition::from_settings(&settings).is_err());
    }
}
