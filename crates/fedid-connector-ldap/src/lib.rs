//! # fedid-connector-ldap
//!
//! Data connector backed by an LDAP directory.
//!
//! ## Security Requirements
//!
//! - All connections use LDAPS (TLS from connection start)
//! - STARTTLS is NOT supported
//! - Plain LDAP is NOT supported
//! - Bind credentials are never logged
//!
//! A directory context is opened per resolve call and always closed. A
//! search failing with a connection-class error is retried once on a
//! fresh connection; a search matching zero or more than one entry is a
//! resolution error, since a multi-entry result cannot be disambiguated.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod connector;
pub mod error;

pub use config::{ldap_escape, LdapConnectorOptions};
pub use connector::{register_ldap_connector, LdapDataConnector};
pub use error::{LdapConnectorError, LdapConnectorResult};
