//! Per-request resolution context.

use serde::{Deserialize, Serialize};

/// Identifies who a resolution pass is for and who asked for it.
///
/// One context is built per incoming request and shared read-only by every
/// plugin invoked during that pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionContext {
    /// Principal name the attributes describe.
    pub principal: String,

    /// Entity ID of the relying party the response is for.
    ///
    /// Absent when the requester is unauthenticated; some definitions
    /// (persistent identifiers) refuse to produce values in that case.
    pub requester: Option<String>,

    /// Entity ID of the responding identity provider.
    pub responder: Option<String>,
}

impl ResolutionContext {
    /// Creates a context for a principal with no requester or responder.
    #[must_use]
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            requester: None,
            responder: None,
        }
    }

    /// Sets the requesting relying party.
    #[must_use]
    pub fn with_requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = Some(requester.into());
        self
    }

    /// Sets the responding identity provider.
    #[must_use]
    pub fn with_responder(mut self, responder: impl Into<String>) -> Self {
        self.responder = Some(responder.into());
        self
    }

    /// Returns the requester, treating an empty string as absent.
    #[must_use]
    pub fn requester(&self) -> Option<&str> {
        self.requester.as_deref().filter(|r| !r.is_empty())
    }
}
