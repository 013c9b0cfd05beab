//! Composite attribute definition.

use fedid_model::{ResolutionContext, ResolverAttribute};
use fedid_spi::{
    AttributeDefinition, Dependencies, PluginConfig, PluginSettings, SpiError, SpiResult,
};
use serde::{Deserialize, Serialize};

/// Options for the composite definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompositeOptions {
    /// Source attribute names, in the positional order the template uses.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Template with `{0}`, `{1}`, ... placeholders. Defaults to the
    /// sources space-joined in order.
    #[serde(default)]
    pub format: Option<String>,
}

/// Combines several source attributes value-by-value through a positional
/// template. Every source must carry the same number of values.
#[derive(Debug)]
pub struct CompositeAttributeDefinition {
    config: PluginConfig,
    sources: Vec<String>,
    format: String,
}

impl CompositeAttributeDefinition {
    /// Builds the definition from settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no sources are declared.
    pub fn from_settings(settings: &PluginSettings) -> SpiResult<Self> {
        let config = PluginConfig::from_settings(settings)?;
        let options: CompositeOptions = settings.typed_options()?;

        if options.sources.is_empty() {
            return Err(SpiError::config(format!(
                "plugin {}: composite requires at least one source",
                config.id()
            )));
        }

        let format = options.format.unwrap_or_else(|| {
            (0..options.sources.len())
                .map(|i| format!("{{{i}}}"))
                .collect::<Vec<_>>()
                .join(" ")
        });

        Ok(Self {
            config,
            sources: options.sources,
            format,
        })
    }

    fn render(&self, parts: &[&str]) -> String {
        let mut out = self.format.clone();
        for (i, part) in parts.iter().enumerate() {
            out = out.replace(&format!("{{{i}}}"), part);
        }
        out
    }
}

impl AttributeDefinition for CompositeAttributeDefinition {
    fn config(&self) -> &PluginConfig {
        &self.config
    }

    fn resolve(
        &self,
        attribute: &mut ResolverAttribute,
        _ctx: &ResolutionContext,
        deps: &Dependencies,
    ) -> SpiResult<()> {
        let mut columns = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            columns.push(deps.collect_values(&self.config, source));
        }

        let count = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != count) {
            let counts: Vec<String> = self
                .sources
                .iter()
                .zip(&columns)
                .map(|(s, c)| format!("{s}={}", c.len()))
                .collect();
            return Err(SpiError::resolution(
                self.config.id(),
                format!("source value counts differ: {}", counts.join(", ")),
            ));
        }

        for row in 0..count {
            let mut parts = Vec::with_capacity(self.sources.len());
            let mut skip = false;
            for (source, column) in self.sources.iter().zip(&columns) {
                match column[row].as_text() {
                    Some(text) => parts.push(text),
                    None => {
                        tracing::warn!(
                            plugin_id = %self.config.id(),
                            source = %source,
                            "skipping non-text value in composite tuple"
                        );
                        skip = true;
                        break;
                    }
                }
            }
            if !skip {
                attribute.add_value(self.render(&parts).into());
            }
        }
        Ok(())
    }
}
