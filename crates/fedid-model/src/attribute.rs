//! Resolved attributes and raw connector result sets.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::encoder::{PlainEncoder, ValueEncoder};
use crate::error::ModelResult;
use crate::value::AttributeValue;

/// Raw multi-valued attribute data produced by a data connector.
///
/// Attribute names map to ordered value lists. Connectors populate this
/// directly from their source (directory entry, result rows, templates).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    entries: HashMap<String, Vec<AttributeValue>>,
}

impl AttributeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to the named attribute, creating it if needed.
    pub fn add(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.entries.entry(name.into()).or_default().push(value);
    }

    /// Replaces the named attribute's values.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<AttributeValue>) {
        self.entries.insert(name.into(), values);
    }

    /// Gets the values for an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[AttributeValue]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Returns true if the set contains the named attribute.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over all attribute names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of attributes in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set holds no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges another set into this one, appending values for shared names.
    pub fn merge(&mut self, other: AttributeSet) {
        for (name, values) in other.entries {
            self.entries.entry(name).or_default().extend(values);
        }
    }
}

impl FromIterator<(String, Vec<AttributeValue>)> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = (String, Vec<AttributeValue>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A logical attribute accumulated during one resolution pass.
///
/// Created unresolved, mutated in place by attribute definitions, and
/// marked resolved exactly once. Once resolved the value list is frozen:
/// further adds are rejected. A fresh instance is created for every request.
#[derive(Debug, Clone)]
pub struct ResolverAttribute {
    id: String,
    lifetime: Duration,
    values: Vec<AttributeValue>,
    resolved: bool,
    encoder: Arc<dyn ValueEncoder>,
}

impl ResolverAttribute {
    /// Creates a new unresolved attribute with no cache lifetime.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lifetime: Duration::ZERO,
            values: Vec::new(),
            resolved: false,
            encoder: Arc::new(PlainEncoder),
        }
    }

    /// Returns the attribute identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the cache lifetime.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sets the cache lifetime.
    pub fn set_lifetime(&mut self, lifetime: Duration) {
        self.lifetime = lifetime;
    }

    /// Replaces the value-formatting strategy.
    pub fn set_encoder(&mut self, encoder: Arc<dyn ValueEncoder>) {
        self.encoder = encoder;
    }

    /// Returns the value-formatting strategy.
    #[must_use]
    pub fn encoder(&self) -> &Arc<dyn ValueEncoder> {
        &self.encoder
    }

    /// Adds a value, preserving insertion order and skipping duplicates.
    ///
    /// Returns false if the value was a duplicate or the attribute is
    /// already resolved.
    pub fn add_value(&mut self, value: AttributeValue) -> bool {
        if self.resolved || self.values.contains(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Returns the accumulated values in insertion order.
    #[must_use]
    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    /// Returns the values serialized through the attached encoder.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is incompatible with the encoder.
    pub fn encoded_values(&self) -> ModelResult<Vec<String>> {
        self.values.iter().map(|v| self.encoder.encode(v)).collect()
    }

    /// Marks the attribute resolved. Terminal for this resolution pass.
    pub fn mark_resolved(&mut self) {
        self.resolved = true;
    }

    /// Returns whether the attribute has been resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_deduplicate_preserving_order() {
        let mut attr = ResolverAttribute::new("affiliation");
        assert!(attr.add_value("staff".into()));
        assert!(attr.add_value("member".into()));
        assert!(!attr.add_value("staff".into()));

        let values: Vec<_> = attr.values().iter().filter_map(|v| v.as_text()).collect();
        assert_eq!(values, ["staff", "member"]);
    }

    #[test]
    fn resolved_attribute_rejects_new_values() {
        let mut attr = ResolverAttribute::new("mail");
        attr.add_value("a@example.edu".into());
        attr.mark_resolved();

        assert!(!attr.add_value("b@example.edu".into()));
        assert_eq!(attr.values().len(), 1);
        assert!(attr.is_resolved());
    }

    #[test]
    fn attribute_set_merge_appends_values() {
        let mut a = AttributeSet::new();
        a.add("cn", "Jane Doe".into());

        let mut b = AttributeSet::new();
        b.add("cn", "J. Doe".into());
        b.add("sn", "Doe".into());

        a.merge(b);
        assert_eq!(a.get("cn").unwrap().len(), 2);
        assert!(a.contains("sn"));
    }
}
