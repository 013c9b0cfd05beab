//! Model-level error types.

use thiserror::Error;

/// Result type alias for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Errors raised by value encoding and attribute handling.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The encoder cannot handle this value variant.
    #[error("unsupported value type for {encoder}: expected {expected}")]
    UnsupportedValueType {
        /// Encoder that rejected the value.
        encoder: &'static str,
        /// Expected value variant.
        expected: &'static str,
    },

    /// A stored value could not be decoded.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
}
