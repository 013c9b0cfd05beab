//! Assertion XML serialization.
//!
//! Renders the assertion model into SAML 2.0 XML for the bindings to
//! carry. Parsing and signature handling live elsewhere; this module only
//! writes.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::{Assertion, AttributeStatement, Conditions, NameId, Subject};

fn instant(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Serializes an assertion to SAML 2.0 XML.
#[must_use]
pub fn serialize_assertion(assertion: &Assertion) -> String {
    let mut out = format!(
        r#"<saml2:Assertion xmlns:saml2="urn:oasis:names:tc:SAML:2.0:assertion" ID="{}" IssueInstant="{}" Version="{}">"#,
        xml_escape(&assertion.id),
        instant(assertion.issue_instant),
        xml_escape(&assertion.version),
    );
    out.push_str(&format!(
        "<saml2:Issuer>{}</saml2:Issuer>",
        xml_escape(&assertion.issuer)
    ));

    if let Some(subject) = &assertion.subject {
        out.push_str(&serialize_subject(subject));
    }
    if let Some(conditions) = &assertion.conditions {
        out.push_str(&serialize_conditions(conditions));
    }
    if let Some(authn) = &assertion.authn_statement {
        out.push_str(&format!(
            r#"<saml2:AuthnStatement AuthnInstant="{}"{}><saml2:AuthnContext><saml2:AuthnContextClassRef>{}</saml2:AuthnContextClassRef></saml2:AuthnContext></saml2:AuthnStatement>"#,
            instant(authn.authn_instant),
            authn.session_index.as_deref().map_or(String::new(), |s| {
                format!(r#" SessionIndex="{}""#, xml_escape(s))
            }),
            xml_escape(&authn.context_class),
        ));
    }
    if let Some(statement) = &assertion.attribute_statement {
        out.push_str(&serialize_attribute_statement(statement));
    }

    out.push_str("</saml2:Assertion>");
    out
}

fn serialize_name_id(name_id: &NameId) -> String {
    let mut attrs = format!(r#" Format="{}""#, name_id.format.uri());
    if let Some(q) = &name_id.name_qualifier {
        attrs.push_str(&format!(r#" NameQualifier="{}""#, xml_escape(q)));
    }
    if let Some(q) = &name_id.sp_name_qualifier {
        attrs.push_str(&format!(r#" SPNameQualifier="{}""#, xml_escape(q)));
    }
    format!(
        "<saml2:NameID{attrs}>{}</saml2:NameID>",
        xml_escape(&name_id.value)
    )
}

fn serialize_subject(subject: &Subject) -> String {
    let mut out = String::from("<saml2:Subject>");
    out.push_str(&serialize_name_id(&subject.name_id));
    for confirmation in &subject.confirmations {
        let mut data_attrs = String::new();
        if let Some(recipient) = &confirmation.recipient {
            data_attrs.push_str(&format!(r#" Recipient="{}""#, xml_escape(recipient)));
        }
        if let Some(expiry) = confirmation.not_on_or_after {
            data_attrs.push_str(&format!(r#" NotOnOrAfter="{}""#, instant(expiry)));
        }
        if let Some(in_response_to) = &confirmation.in_response_to {
            data_attrs.push_str(&format!(
                r#" InResponseTo="{}""#,
                xml_escape(in_response_to)
            ));
        }
        out.push_str(&format!(
            r#"<saml2:SubjectConfirmation Method="{}"><saml2:SubjectConfirmationData{}/></saml2:SubjectConfirmation>"#,
            xml_escape(&confirmation.method),
            data_attrs,
        ));
    }
    out.push_str("</saml2:Subject>");
    out
}

fn serialize_conditions(conditions: &Conditions) -> String {
    let mut attrs = String::new();
    if let Some(not_before) = conditions.not_before {
        attrs.push_str(&format!(r#" NotBefore="{}""#, instant(not_before)));
    }
    if let Some(not_on_or_after) = conditions.not_on_or_after {
        attrs.push_str(&format!(r#" NotOnOrAfter="{}""#, instant(not_on_or_after)));
    }

    let mut out = format!("<saml2:Conditions{attrs}>");
    for restriction in &conditions.audience_restrictions {
        out.push_str("<saml2:AudienceRestriction>");
        for audience in &restriction.audiences {
            out.push_str(&format!(
                "<saml2:Audience>{}</saml2:Audience>",
                xml_escape(audience)
            ));
        }
        out.push_str("</saml2:AudienceRestriction>");
    }
    out.push_str("</saml2:Conditions>");
    out
}

fn serialize_attribute_statement(statement: &AttributeStatement) -> String {
    let mut out = String::from("<saml2:AttributeStatement>");
    for attribute in &statement.attributes {
        let friendly = attribute
            .friendly_name
            .as_deref()
            .map_or(String::new(), |f| {
                format!(r#" FriendlyName="{}""#, xml_escape(f))
            });
        out.push_str(&format!(
            r#"<saml2:Attribute Name="{}" NameFormat="{}"{friendly}>"#,
            xml_escape(&attribute.name),
            xml_escape(&attribute.name_format),
        ));
        for value in &attribute.values {
            out.push_str(&format!(
                "<saml2:AttributeValue>{}</saml2:AttributeValue>",
                xml_escape(value)
            ));
        }
        out.push_str("</saml2:Attribute>");
    }
    out.push_str("</saml2:AttributeStatement>");
    out
}
