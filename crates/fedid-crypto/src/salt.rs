//! Secret salt handling.

use std::fmt;
use std::path::Path;

use rand::RngCore;
use thiserror::Error;

/// The salt value shipped in the example configuration.
///
/// Deployments that never changed it produce guessable persistent
/// identifiers; loading it triggers a loud warning.
const EXAMPLE_CONFIG_SALT: &str = "changethissaltvalue";

/// Result type alias for crypto operations.
pub type CryptoResult<T> = std::result::Result<T, CryptoError>;

/// Errors raised while loading secrets.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A secret file could not be read.
    #[error("failed to read secret file: {0}")]
    SecretFile(String),

    /// The loaded secret is unusable.
    #[error("invalid secret: {0}")]
    InvalidSecret(String),
}

/// A secret salt mixed into persistent-identifier digests.
///
/// Never printed: the `Debug` and `Display` impls redact the content.
#[derive(Clone)]
pub struct Salt {
    bytes: Vec<u8>,
}

impl Salt {
    /// Creates a salt from an inline configuration value.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty value.
    pub fn from_inline(value: &str) -> CryptoResult<Self> {
        if value.is_empty() {
            return Err(CryptoError::InvalidSecret("salt must be non-empty".to_string()));
        }
        if value == EXAMPLE_CONFIG_SALT {
            tracing::warn!(
                "persistent-ID salt matches the example configuration value; \
                 generated identifiers are guessable until it is changed"
            );
        }
        Ok(Self {
            bytes: value.as_bytes().to_vec(),
        })
    }

    /// Loads a salt from a secret file, trimming trailing whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is empty.
    pub fn from_file(path: impl AsRef<Path>) -> CryptoResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CryptoError::SecretFile(e.to_string()))?;
        Self::from_inline(raw.trim_end())
    }

    /// Generates a random salt of `len` bytes.
    #[must_use]
    pub fn random(len: usize) -> Self {
        let mut bytes = vec![0u8; len];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Returns the salt bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns whether this salt equals the example-configuration default.
    #[must_use]
    pub fn is_example_default(&self) -> bool {
        self.bytes == EXAMPLE_CONFIG_SALT.as_bytes()
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Salt").field("bytes", &"<redacted>").finish()
    }
}
