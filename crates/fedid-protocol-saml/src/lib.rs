//! # fedid-protocol-saml
//!
//! SAML 2.0 assertion model and transport bindings for the identity
//! provider: assertion/subject/conditions types, attribute-statement
//! construction from resolved attributes, and the HTTP-POST and
//! HTTP-Redirect binding codecs.
//!
//! XML digital signatures are out of scope; [`signature::AssertionSigner`]
//! is the seam a deployment plugs a real signer into.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod bindings;
pub mod builder;
pub mod error;
pub mod signature;
pub mod types;
pub mod xml;

pub use builder::{AssertionBuilder, AttributeStatementBuilder};
pub use error::{SamlError, SamlResult};
pub use signature::{AssertionSigner, PassthroughSigner};
pub use types::{
    Assertion, AttributeStatement, AudienceRestriction, AuthnStatement, Conditions, NameId,
    NameIdFormat, SamlAttribute, Subject, SubjectConfirmation,
};
pub use xml::serialize_assertion;
