//! Resolver topology loading.
//!
//! The topology document lists every connector and definition as a
//! `[[plugin]]` table:
//!
//! ```toml
//! [[plugin]]
//! id = "dir"
//! type = "ldap"
//! cache_ttl_secs = 300
//! [plugin.options]
//! url = "ldaps://ldap.example.edu:636"
//! # ...
//!
//! [[plugin]]
//! id = "mail"
//! type = "simple"
//! connector_dependencies = ["dir"]
//! ```

use std::path::Path;

use fedid_spi::PluginSettings;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TopologyDocument {
    #[serde(default, rename = "plugin")]
    plugins: Vec<PluginSettings>,
}

/// Loads plugin settings from a topology TOML file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_topology(path: impl AsRef<Path>) -> anyhow::Result<Vec<PluginSettings>> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    parse_topology(&raw)
}

fn parse_topology(raw: &str) -> anyhow::Result<Vec<PluginSettings>> {
    let document: TopologyDocument = toml::from_str(raw)?;
    if document.plugins.is_empty() {
        anyhow::bail!("topology declares no plugins");
    }
    Ok(document.plugins)
}
