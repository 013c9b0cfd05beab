//! # fedid-spi
//!
//! Service Provider Interface for the attribute resolver.
//!
//! This crate defines the plugin abstractions the resolver is built from:
//! - [`DataConnector`] - fetches raw attribute data from an external source
//! - [`AttributeDefinition`] - derives one logical attribute's values
//! - [`PluginConfig`] - common configuration shared by every plugin
//! - [`Dependencies`] - per-request results table populated in DAG order
//! - [`PluginRegistry`] - string-keyed factory registry
//!
//! ## Design
//!
//! Plugins are loaded through the registry rather than by reflective class
//! name: a "custom" plugin is an ordinary factory registered under its type
//! name at startup.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod connector;
pub mod definition;
pub mod dependencies;
pub mod error;
pub mod plugin;
pub mod registry;

pub use connector::DataConnector;
pub use definition::AttributeDefinition;
pub use dependencies::Dependencies;
pub use error::{SpiError, SpiResult};
pub use plugin::{PluginConfig, PluginSettings, PRINCIPAL_TOKEN};
pub use registry::{ConnectorFactory, DefinitionFactory, PluginRegistry};
