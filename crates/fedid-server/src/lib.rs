//! # fedid-server
//!
//! HTTP front end for the attribute authority:
//! - `GET /health` - liveness
//! - `POST /resolve` - resolve attributes for a principal as JSON
//! - `GET /saml/sso` - issue a SAML assertion via the HTTP-POST binding
//!
//! The resolver topology (connectors and definitions) is loaded from a
//! TOML document; server settings come from `FEDID_*` environment
//! variables.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod router;
pub mod state;
pub mod topology;

pub use config::ServerConfig;
pub use router::create_router;
pub use state::AppState;
pub use topology::load_topology;
