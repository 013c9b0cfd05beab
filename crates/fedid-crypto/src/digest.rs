//! Hash functions.

use aws_lc_rs::digest;

/// Computes a SHA-1 digest.
///
/// **Compatibility only**: the persistent-identifier wire format consumed
/// by existing relying parties is a SHA-1 digest. Do not use this for
/// anything new.
#[must_use]
pub fn sha1_legacy(data: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, data)
        .as_ref()
        .to_vec()
}

/// Computes a SHA-384 digest.
#[must_use]
pub fn sha384(data: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA384, data).as_ref().to_vec()
}
