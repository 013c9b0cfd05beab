//! HTTP-Redirect binding.

use std::io::{Read, Write};

use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::{SamlError, SamlResult};

use super::{DecodedMessage, SamlMessageType};

/// HTTP-Redirect binding encoder/decoder.
pub struct HttpRedirectBinding;

impl HttpRedirectBinding {
    /// Encodes a SAML message into a redirect URL.
    ///
    /// # Errors
    ///
    /// Returns a decoding error when compression fails.
    pub fn encode(
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
        message_type: SamlMessageType,
    ) -> SamlResult<String> {
        let compressed = deflate(xml.as_bytes())?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&compressed);
        let url_encoded = urlencoding::encode(&encoded);

        let separator = if destination.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{destination}{separator}{}={url_encoded}",
            message_type.param_name()
        );
        if let Some(rs) = relay_state {
            url.push_str(&format!("&RelayState={}", urlencoding::encode(rs)));
        }
        Ok(url)
    }

    /// Decodes a query parameter value back into the XML message.
    ///
    /// The value is expected URL-decoded already (web frameworks decode
    /// query parameters before handing them over).
    ///
    /// # Errors
    ///
    /// Returns a decoding error for invalid base64, DEFLATE, or UTF-8
    /// content.
    pub fn decode(
        encoded: &str,
        message_type: SamlMessageType,
        relay_state: Option<&str>,
    ) -> SamlResult<DecodedMessage> {
        let compressed = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| SamlError::Decoding(format!("invalid base64: {e}")))?;
        let bytes = inflate(&compressed)?;
        let xml = String::from_utf8(bytes)
            .map_err(|e| SamlError::Decoding(format!("invalid UTF-8: {e}")))?;

        Ok(DecodedMessage {
            xml,
            message_type,
            relay_state: relay_state.map(str::to_string),
        })
    }
}

fn deflate(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|()| encoder.finish())
        .map_err(|e| SamlError::Decoding(format!("deflate failed: {e}")))
}

fn inflate(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| SamlError::Decoding(format!("inflate failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<samlp:AuthnRequest ID="_r2"></samlp:AuthnRequest>"#;

    #[test]
    fn encode_produces_query_parameters() {
        let url = HttpRedirectBinding::encode(
            XML,
            "https://idp.example.edu/sso",
            Some("state-2"),
            SamlMessageType::Request,
        )
        .unwrap();

        assert!(url.starts_with("https://idp.example.edu/sso?SAMLRequest="));
        assert!(url.contains("&RelayState=state-2"));
    }

    #[test]
    fn existing_query_string_uses_ampersand() {
        let url = HttpRedirectBinding::encode(
            XML,
            "https://idp.example.edu/sso?tenant=a",
            None,
            SamlMessageType::Request,
        )
        .unwrap();
        assert!(url.contains("?tenant=a&SAMLRequest="));
    }

    #[test]
    fn encode_decode_round_trip() {
        let url = HttpRedirectBinding::encode(
            XML,
            "https://idp.example.edu/sso",
            None,
            SamlMessageType::Request,
        )
        .unwrap();

        let param = url.split("SAMLRequest=").nth(1).unwrap();
        let decoded_param = urlencoding::decode(param).unwrap();
        let message =
            HttpRedirectBinding::decode(&decoded_param, SamlMessageType::Request, None).unwrap();
        assert_eq!(message.xml, XML);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let result = HttpRedirectBinding::decode("AAAA", SamlMessageType::Request, None);
        assert!(matches!(result, Err(SamlError::Decoding(_))));
    }
}
