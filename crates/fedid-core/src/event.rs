//! Audit events for fedid.
//!
//! Structured records for security-relevant operations. Every event carries
//! a timestamp, the principal involved (when known), the requesting relying
//! party, and the outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Attributes resolved for a principal.
    AttributeResolution,
    /// Attribute resolution failed.
    AttributeResolutionError,
    /// A data connector failed and its failover was invoked.
    ConnectorFailover,
    /// A SAML assertion was issued.
    AssertionIssued,
    /// Assertion issuance failed.
    AssertionError,
    /// Resolver configuration was loaded.
    ConfigurationLoaded,
    /// Resolver configuration was rejected.
    ConfigurationError,
}

/// Outcome of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventOutcome {
    /// The operation completed.
    Success,
    /// The operation failed.
    Failure,
}

/// An audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,

    /// When the event occurred.
    pub timestamp: DateTime<Utc>,

    /// Event type.
    pub event_type: EventType,

    /// Outcome.
    pub outcome: EventOutcome,

    /// Principal the event concerns, if known.
    pub principal: Option<String>,

    /// Requesting relying party entity ID, if known.
    pub requester: Option<String>,

    /// Free-form detail. Must not contain credentials or salts.
    pub detail: Option<String>,
}

impl Event {
    /// Creates a new successful event.
    #[must_use]
    pub fn success(event_type: EventType) -> Self {
        Self::new(event_type, EventOutcome::Success)
    }

    /// Creates a new failure event.
    #[must_use]
    pub fn failure(event_type: EventType) -> Self {
        Self::new(event_type, EventOutcome::Failure)
    }

    fn new(event_type: EventType, outcome: EventOutcome) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type,
            outcome,
            principal: None,
            requester: None,
            detail: None,
        }
    }

    /// Sets the principal.
    #[must_use]
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// Sets the requester.
    #[must_use]
    pub fn with_requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = Some(requester.into());
        self
    }

    /// Sets the detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
