//! # fedid-crypto
//!
//! Digest and secret-salt handling for the identity provider.
//!
//! SHA-1 appears here solely because the persistent-identifier format is
//! fixed by deployed relying parties; nothing new should use it. Everything
//! else hashes with SHA-384.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod digest;
pub mod salt;

pub use digest::{sha1_legacy, sha384};
pub use salt::{CryptoError, CryptoResult, Salt};
