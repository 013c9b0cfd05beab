//! # fedid-model
//!
//! Domain model for attribute resolution: attribute values, the
//! [`ResolverAttribute`] accumulated during a resolution pass, the
//! raw [`AttributeSet`] produced by data connectors, value encoders,
//! and the per-request [`ResolutionContext`].

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod attribute;
pub mod context;
pub mod encoder;
pub mod error;
pub mod value;

pub use attribute::{AttributeSet, ResolverAttribute};
pub use context::ResolutionContext;
pub use encoder::{Base64ValueEncoder, PlainEncoder, ScopedStringEncoder, ValueEncoder};
pub use error::{ModelError, ModelResult};
pub use value::AttributeValue;
