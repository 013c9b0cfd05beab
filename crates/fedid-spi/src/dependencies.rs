//! Per-request dependency results table.

use std::collections::HashMap;

use fedid_model::{AttributeSet, AttributeValue, ResolverAttribute};

use crate::plugin::PluginConfig;

/// Results gathered so far in one resolution pass.
///
/// The orchestrator populates this table as it walks the dependency graph;
/// by the time a plugin runs, every one of its declared dependencies has an
/// entry (or was deliberately skipped after a swallowed failure).
#[derive(Debug, Default)]
pub struct Dependencies {
    connector_results: HashMap<String, AttributeSet>,
    attribute_results: HashMap<String, ResolverAttribute>,
}

impl Dependencies {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a connector's result.
    pub fn insert_connector_result(&mut self, id: impl Into<String>, set: AttributeSet) {
        self.connector_results.insert(id.into(), set);
    }

    /// Records a resolved attribute.
    pub fn insert_attribute_result(&mut self, attribute: ResolverAttribute) {
        self.attribute_results
            .insert(attribute.id().to_string(), attribute);
    }

    /// Gets a connector's result set.
    #[must_use]
    pub fn connector_result(&self, id: &str) -> Option<&AttributeSet> {
        self.connector_results.get(id)
    }

    /// Gets a resolved attribute.
    #[must_use]
    pub fn attribute_result(&self, id: &str) -> Option<&ResolverAttribute> {
        self.attribute_results.get(id)
    }

    /// Returns whether a connector result has been recorded.
    #[must_use]
    pub fn has_connector_result(&self, id: &str) -> bool {
        self.connector_results.contains_key(id)
    }

    /// Returns whether an attribute has been resolved.
    #[must_use]
    pub fn has_attribute_result(&self, id: &str) -> bool {
        self.attribute_results.contains_key(id)
    }

    /// Collects the values named `source` across all of a plugin's declared
    /// dependencies, in declaration order.
    ///
    /// Connector dependencies contribute the values of the attribute named
    /// `source` in their result set. An attribute dependency contributes its
    /// resolved values when its id equals `source`.
    #[must_use]
    pub fn collect_values(&self, config: &PluginConfig, source: &str) -> Vec<AttributeValue> {
        let mut values = Vec::new();

        for connector_id in config.connector_dependencies() {
            if let Some(set) = self.connector_results.get(connector_id) {
                if let Some(found) = set.get(source) {
                    values.extend_from_slice(found);
                }
            }
        }

        for attribute_id in config.attribute_dependencies() {
            if attribute_id != source {
                continue;
            }
            if let Some(attr) = self.attribute_results.get(attribute_id) {
                values.extend_from_slice(attr.values());
            }
        }

        values
    }
}
