//! Assertion construction from resolved attributes.

use chrono::{DateTime, Duration, Utc};
use fedid_model::ResolverAttribute;

use crate::error::{SamlError, SamlResult};
use crate::types::{
    attribute_oid, Assertion, AttributeStatement, AuthnStatement, Conditions, NameId,
    SamlAttribute, Subject, NAME_FORMAT_URI,
};

/// Builds an attribute statement from resolved attributes.
///
/// Attribute names are mapped to their wire OIDs where known; values are
/// serialized through each attribute's attached encoder. Unresolved
/// attributes are skipped, and an attribute whose values cannot be
/// encoded is dropped with a warning rather than failing the statement.
#[derive(Debug, Default)]
pub struct AttributeStatementBuilder {
    attributes: Vec<SamlAttribute>,
}

impl AttributeStatementBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resolved attribute.
    pub fn add(&mut self, attribute: &ResolverAttribute) {
        if !attribute.is_resolved() {
            tracing::warn!(
                attribute = %attribute.id(),
                "skipping unresolved attribute in statement"
            );
            return;
        }
        if attribute.values().is_empty() {
            return;
        }

        let values = match attribute.encoded_values() {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(
                    attribute = %attribute.id(),
                    error = %e,
                    "dropping attribute whose values failed to encode"
                );
                return;
            }
        };

        let (name, friendly_name) = match attribute_oid(attribute.id()) {
            Some(oid) => (oid.to_string(), Some(attribute.id().to_string())),
            None => (attribute.id().to_string(), None),
        };

        self.attributes.push(SamlAttribute {
            name,
            name_format: NAME_FORMAT_URI.to_string(),
            friendly_name,
            values,
        });
    }

    /// Adds every attribute from a slice.
    pub fn add_all(&mut self, attributes: &[ResolverAttribute]) {
        for attribute in attributes {
            self.add(attribute);
        }
    }

    /// Builds the statement.
    #[must_use]
    pub fn build(self) -> AttributeStatement {
        AttributeStatement {
            attributes: self.attributes,
        }
    }
}

/// Builds a complete assertion for one principal/relying-party pair.
#[derive(Debug)]
pub struct AssertionBuilder {
    issuer: String,
    audience: String,
    name_id: NameId,
    lifetime: Duration,
    issue_instant: DateTime<Utc>,
    authn_context_class: Option<String>,
    attributes: Vec<ResolverAttribute>,
    recipient: Option<String>,
}

impl AssertionBuilder {
    /// Creates a builder for an issuer/audience pair.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        name_id: NameId,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            name_id,
            lifetime: Duration::minutes(5),
            issue_instant: Utc::now(),
            authn_context_class: None,
            attributes: Vec::new(),
            recipient: None,
        }
    }

    /// Sets the validity lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive lifetime.
    pub fn lifetime_secs(mut self, secs: i64) -> SamlResult<Self> {
        if secs <= 0 {
            return Err(SamlError::InvalidMessage(
                "assertion lifetime must be positive".to_string(),
            ));
        }
        self.lifetime = Duration::seconds(secs);
        Ok(self)
    }

    /// Fixes the issue instant (useful for tests).
    #[must_use]
    pub fn issued_at(mut self, instant: DateTime<Utc>) -> Self {
        self.issue_instant = instant;
        self
    }

    /// Adds an authentication statement with the given context class.
    #[must_use]
    pub fn authn_context(mut self, context_class: impl Into<String>) -> Self {
        self.authn_context_class = Some(context_class.into());
        self
    }

    /// Sets the bearer-confirmation recipient URL.
    #[must_use]
    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Adds resolved attributes to the statement.
    #[must_use]
    pub fn attributes(mut self, attributes: &[ResolverAttribute]) -> Self {
        self.attributes.extend_from_slice(attributes);
        self
    }

    /// Builds the assertion.
    #[must_use]
    pub fn build(self) -> Assertion {
        let not_on_or_after = self.issue_instant + self.lifetime;

        let mut subject = Subject::new(self.name_id);
        if let Some(recipient) = &self.recipient {
            subject = subject.with_bearer_confirmation(recipient.clone(), not_on_or_after);
        }

        let mut assertion = Assertion::new(self.issuer)
            .with_subject(subject)
            .with_conditions(
                Conditions::window(self.issue_instant, not_on_or_after)
                    .with_audience(self.audience),
            );
        assertion.issue_instant = self.issue_instant;

        if let Some(context_class) = self.authn_context_class {
            assertion = assertion.with_authn_statement(AuthnStatement {
                authn_instant: self.issue_instant,
                context_class,
                session_index: None,
            });
        }

        let mut statement = AttributeStatementBuilder::new();
        statement.add_all(&self.attributes);
        let statement = statement.build();
        if !statement.attributes.is_empty() {
            assertion = assertion.with_attribute_statement(statement);
        }

        assertion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fedid_model::{AttributeValue, Base64ValueEncoder, ScopedStringEncoder};

    fn resolved(id: &str, values: &[&str]) -> ResolverAttribute {
        let mut attr = ResolverAttribute::new(id);
        for v in values {
            attr.add_value((*v).into());
        }
        attr.mark_resolved();
        attr
    }

    #[test]
    fn known_attributes_get_oid_names() {
        let mut builder = AttributeStatementBuilder::new();
        builder.add(&resolved("mail", &["jdoe@example.edu"]));
        let statement = builder.build();

        assert_eq!(statement.attributes[0].name, "urn:oid:0.9.2342.19200300.100.1.3");
        assert_eq!(statement.attributes[0].friendly_name.as_deref(), Some("mail"));
    }

    #[test]
    fn unknown_attributes_keep_their_id() {
        let mut builder = AttributeStatementBuilder::new();
        builder.add(&resolved("departmentCode", &["0042"]));
        let statement = builder.build();

        assert_eq!(statement.attributes[0].name, "departmentCode");
        assert!(statement.attributes[0].friendly_name.is_none());
    }

    #[test]
    fn unresolved_and_empty_attributes_are_skipped() {
        let mut builder = AttributeStatementBuilder::new();
        builder.add(&ResolverAttribute::new("mail"));
        builder.add(&resolved("displayName", &[]));
        assert!(builder.build().attributes.is_empty());
    }

    #[test]
    fn scoped_encoder_shapes_statement_values() {
        let mut attr = ResolverAttribute::new("eduPersonTargetedID");
        attr.set_encoder(Arc::new(ScopedStringEncoder::new("example.edu")));
        attr.add_value("AAdzZWNyZXQ".into());
        attr.mark_resolved();

        let mut builder = AttributeStatementBuilder::new();
        builder.add(&attr);
        let statement = builder.build();
        assert_eq!(statement.attributes[0].values[0], "AAdzZWNyZXQ@example.edu");
    }

    #[test]
    fn encode_failures_drop_the_attribute_not_the_statement() {
        // Text values behind a byte-only encoder cannot serialize.
        let mut bad = ResolverAttribute::new("certificate");
        bad.set_encoder(Arc::new(Base64ValueEncoder));
        bad.add_value(AttributeValue::text("not-bytes"));
        bad.mark_resolved();

        let mut builder = AttributeStatementBuilder::new();
        builder.add(&bad);
        builder.add(&resolved("mail", &["jdoe@example.edu"]));

        let statement = builder.build();
        assert_eq!(statement.attributes.len(), 1);
        assert_eq!(statement.attributes[0].friendly_name.as_deref(), Some("mail"));
    }

    #[test]
    fn assertion_builder_produces_valid_assertion() {
        let issued = Utc::now();
        let assertion = AssertionBuilder::new(
            "https://idp.example.edu/idp",
            "https://sp.example.org/shibboleth",
            NameId::transient("abc123"),
        )
        .lifetime_secs(300)
        .unwrap()
        .issued_at(issued)
        .authn_context("urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport")
        .recipient("https://sp.example.org/SAML2/POST")
        .attributes(&[resolved("mail", &["jdoe@example.edu"])])
        .build();

        assertion
            .validate("https://sp.example.org/shibboleth", issued)
            .unwrap();
        assert!(assertion.attribute_statement.is_some());
        assert!(assertion.authn_statement.is_some());
        assert_eq!(
            assertion.subject.as_ref().unwrap().confirmations.len(),
            1
        );
    }

    #[test]
    fn non_positive_lifetime_is_rejected() {
        let result = AssertionBuilder::new(
            "https://idp.example.edu/idp",
            "https://sp.example.org/shibboleth",
            NameId::transient("abc123"),
        )
        .lifetime_secs(0);
        assert!(result.is_err());
    }
}
