//! HTTP-POST binding.

use base64::Engine;

use crate::error::{SamlError, SamlResult};

use super::{DecodedMessage, SamlMessageType};

/// HTTP-POST binding encoder/decoder.
pub struct HttpPostBinding;

impl HttpPostBinding {
    /// Encodes a SAML message into an auto-submitting HTML form.
    #[must_use]
    pub fn encode(
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
        message_type: SamlMessageType,
    ) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(xml);
        let param_name = message_type.param_name();

        let relay_state_input = relay_state
            .map(|rs| {
                format!(
                    r#"<input type="hidden" name="RelayState" value="{}"/>"#,
                    html_escape(rs)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>SAML POST Binding</title>
</head>
<body onload="document.forms[0].submit()">
    <noscript>
        <p>JavaScript is disabled. Click the button below to continue.</p>
    </noscript>
    <form method="post" action="{}">
        <input type="hidden" name="{}" value="{}"/>
        {}
        <noscript>
            <input type="submit" value="Continue"/>
        </noscript>
    </form>
</body>
</html>"#,
            html_escape(destination),
            param_name,
            encoded,
            relay_state_input
        )
    }

    /// Decodes a form parameter value back into the XML message.
    ///
    /// # Errors
    ///
    /// Returns a decoding error for invalid base64 or non-UTF-8 content.
    pub fn decode(
        encoded: &str,
        message_type: SamlMessageType,
        relay_state: Option<&str>,
    ) -> SamlResult<DecodedMessage> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| SamlError::Decoding(format!("invalid base64: {e}")))?;
        let xml = String::from_utf8(bytes)
            .map_err(|e| SamlError::Decoding(format!("invalid UTF-8: {e}")))?;

        Ok(DecodedMessage {
            xml,
            message_type,
            relay_state: relay_state.map(str::to_string),
        })
    }
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
