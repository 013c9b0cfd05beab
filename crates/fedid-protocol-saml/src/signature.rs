//! Assertion signing seam.
//!
//! XML digital signatures (canonicalization, reference digests, key
//! info) are not implemented here; deployments plug in a signer built on
//! a dedicated XML-DSig implementation.

use crate::error::SamlResult;
use crate::types::Assertion;

/// Signs assertions before they leave the identity provider.
pub trait AssertionSigner: Send + Sync {
    /// Signs the serialized assertion, returning the signed document.
    ///
    /// # Errors
    ///
    /// Returns an error when signing fails.
    fn sign(&self, assertion: &Assertion, serialized: &str) -> SamlResult<String>;
}

/// Pass-through signer for deployments that sign at the response layer
/// or terminate trust elsewhere. The assertion is returned unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSigner;

impl AssertionSigner for PassthroughSigner {
    fn sign(&self, _assertion: &Assertion, serialized: &str) -> SamlResult<String> {
        Ok(serialized.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_returns_input_unchanged() {
        let assertion = Assertion::new("https://idp.example.edu/idp");
        let signer = PassthroughSigner;
        let out = signer.sign(&assertion, "<Assertion/>").unwrap();
        assert_eq!(out, "<Assertion/>");
    }
}
