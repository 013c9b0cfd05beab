//! SAML 2.0 transport bindings.
//!
//! - **HTTP-POST**: messages are base64-encoded into an auto-submitting
//!   HTML form.
//! - **HTTP-Redirect**: messages are DEFLATE-compressed, base64-encoded,
//!   and URL-encoded into query parameters.

mod post;
mod redirect;

pub use post::HttpPostBinding;
pub use redirect::HttpRedirectBinding;

/// SAML message type for binding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamlMessageType {
    /// AuthnRequest message.
    Request,
    /// Response message.
    Response,
}

impl SamlMessageType {
    /// Returns the form/query parameter name for this message type.
    #[must_use]
    pub const fn param_name(&self) -> &'static str {
        match self {
            Self::Request => "SAMLRequest",
            Self::Response => "SAMLResponse",
        }
    }
}

/// A message decoded from a binding.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    /// The decoded XML message.
    pub xml: String,
    /// The message type.
    pub message_type: SamlMessageType,
    /// The relay state, if present.
    pub relay_state: Option<String>,
}
