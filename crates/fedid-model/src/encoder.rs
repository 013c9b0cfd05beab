//! Value-formatting strategies.
//!
//! Encoders turn stored [`AttributeValue`]s into the wire strings placed in
//! attribute statements, and normalize external strings back into values.
//! Encode and decode are symmetric for text encoders.

use std::fmt::Debug;

use base64::Engine;

use crate::error::{ModelError, ModelResult};
use crate::value::AttributeValue;

/// Serializes one attribute value for external consumption.
pub trait ValueEncoder: Send + Sync + Debug {
    /// Encodes a value into its wire representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the value variant is not supported by this
    /// encoder.
    fn encode(&self, value: &AttributeValue) -> ModelResult<String>;

    /// Normalizes a wire string back into a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid for this encoding.
    fn decode(&self, raw: &str) -> ModelResult<AttributeValue>;
}

/// Pass-through encoder for text values.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainEncoder;

impl ValueEncoder for PlainEncoder {
    fn encode(&self, value: &AttributeValue) -> ModelResult<String> {
        match value {
            AttributeValue::Text(s) => Ok(s.clone()),
            AttributeValue::Bytes(_) => Err(ModelError::UnsupportedValueType {
                encoder: "plain",
                expected: "text",
            }),
        }
    }

    fn decode(&self, raw: &str) -> ModelResult<AttributeValue> {
        Ok(AttributeValue::text(raw))
    }
}

/// Base64 encoder for byte values.
///
/// Text values are rejected: callers holding text have no business routing
/// it through a binary encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64ValueEncoder;

impl ValueEncoder for Base64ValueEncoder {
    fn encode(&self, value: &AttributeValue) -> ModelResult<String> {
        match value {
            AttributeValue::Bytes(b) => {
                Ok(base64::engine::general_purpose::STANDARD.encode(b))
            }
            AttributeValue::Text(_) => Err(ModelError::UnsupportedValueType {
                encoder: "base64",
                expected: "bytes",
            }),
        }
    }

    fn decode(&self, raw: &str) -> ModelResult<AttributeValue> {
        base64::engine::general_purpose::STANDARD
            .decode(raw)
            .map(AttributeValue::Bytes)
            .map_err(|e| ModelError::InvalidEncoding(e.to_string()))
    }
}

/// Scoped-string encoder.
///
/// A scoped value has the form `value@scope`. Values already carrying a
/// scope pass through untouched; unscoped values get the default scope
/// appended. Decode applies the same normalization, so the two directions
/// are symmetric.
#[derive(Debug, Clone)]
pub struct ScopedStringEncoder {
    default_scope: String,
}

impl ScopedStringEncoder {
    /// Creates an encoder with the given default scope.
    #[must_use]
    pub fn new(default_scope: impl Into<String>) -> Self {
        Self {
            default_scope: default_scope.into(),
        }
    }

    /// Returns the default scope.
    #[must_use]
    pub fn default_scope(&self) -> &str {
        &self.default_scope
    }

    fn normalize(&self, raw: &str) -> String {
        if raw.contains('@') {
            raw.to_string()
        } else {
            format!("{raw}@{}", self.default_scope)
        }
    }
}

impl ValueEncoder for ScopedStringEncoder {
    fn encode(&self, value: &AttributeValue) -> ModelResult<String> {
        match value {
            AttributeValue::Text(s) => Ok(self.normalize(s)),
            AttributeValue::Bytes(_) => Err(ModelError::UnsupportedValueType {
                encoder: "scoped",
                expected: "text",
            }),
        }
    }

    fn decode(&self, raw: &str) -> ModelResult<AttributeValue> {
        Ok(AttributeValue::Text(self.normalize(raw)))
    }
}
