//! Built-in attribute definitions.

pub mod composite;
pub mod formatted;
pub mod mapped;
pub mod pattern;
pub mod persistent_id;
pub mod scriptlet;
pub mod simple;

use fedid_spi::{AttributeDefinition, PluginRegistry};

pub use composite::{CompositeAttributeDefinition, CompositeOptions};
pub use formatted::{FormattedAttributeDefinition, FormattedOptions};
pub use mapped::{MappedAttributeDefinition, MappedOptions, ValueMapEntry};
pub use pattern::{RegexAttributeDefinition, RegexOptions};
pub use persistent_id::{PersistentIdAttributeDefinition, PersistentIdOptions};
pub use scriptlet::{
    register_scriptlet_definition, ScriptBindings, ScriptHost, ScriptletAttributeDefinition,
};
pub use simple::{SimpleAttributeDefinition, SimpleOptions};

/// Registers the built-in definition types that need no external
/// collaborator. The `scriptlet` type takes a script host; register it
/// with [`register_scriptlet_definition`].
pub fn register_builtin_definitions(registry: &PluginRegistry) {
    registry.register_definition("simple", |settings| {
        Ok(Box::new(SimpleAttributeDefinition::from_settings(settings)?)
            as Box<dyn AttributeDefinition>)
    });
    registry.register_definition("composite", |settings| {
        Ok(
            Box::new(CompositeAttributeDefinition::from_settings(settings)?)
                as Box<dyn AttributeDefinition>,
        )
    });
    registry.register_definition("mapped", |settings| {
        Ok(Box::new(MappedAttributeDefinition::from_settings(settings)?)
            as Box<dyn AttributeDefinition>)
    });
    registry.register_definition("regex", |settings| {
        Ok(Box::new(RegexAttributeDefinition::from_settings(settings)?)
            as Box<dyn AttributeDefinition>)
    });
    registry.register_definition("formatted", |settings| {
        Ok(
            Box::new(FormattedAttributeDefinition::from_settings(settings)?)
                as Box<dyn AttributeDefinition>,
        )
    });
    registry.register_definition("persistent-id", |settings| {
        Ok(
            Box::new(PersistentIdAttributeDefinition::from_settings(settings)?)
                as Box<dyn AttributeDefinition>,
        )
    });
}
