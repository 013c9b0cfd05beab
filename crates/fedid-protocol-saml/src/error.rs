//! SAML error types.

use thiserror::Error;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML protocol errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// Invalid message format or content.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Base64 or DEFLATE decoding failed.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// A resolved attribute value could not be encoded into a statement.
    #[error("attribute encoding error: {0}")]
    AttributeEncoding(String),

    /// Assertion conditions not met.
    #[error("assertion conditions not met: {0}")]
    ConditionsNotMet(String),

    /// Assertion expired.
    #[error("assertion expired")]
    AssertionExpired,

    /// Assertion not yet valid.
    #[error("assertion not yet valid")]
    AssertionNotYetValid,

    /// Invalid audience.
    #[error("invalid audience: expected {expected}")]
    InvalidAudience {
        /// The audience the validator was checking for.
        expected: String,
    },

    /// Signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),
}
