//! # fedid-core
//!
//! Shared building blocks for the fedid identity provider:
//! configuration structures, the top-level error taxonomy, and
//! audit events for attribute resolution and assertion issuance.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::Config;
pub use error::{Error, Result};
pub use event::{Event, EventOutcome, EventType};
