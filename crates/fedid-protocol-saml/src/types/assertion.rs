//! SAML assertion types.
//!
//! Assertions contain statements about a subject made by an issuer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SamlError, SamlResult};

use super::NameId;

/// SAML assertion.
///
/// A package of statements made by a SAML authority (the issuer) about a
/// subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assertion {
    /// Unique identifier for this assertion.
    pub id: String,

    /// Version of the SAML protocol (always "2.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Timestamp when this assertion was issued.
    pub issue_instant: DateTime<Utc>,

    /// Entity ID of the identity provider that issued this assertion.
    pub issuer: String,

    /// The subject of this assertion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// Conditions that must hold for the assertion to be valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    /// Authentication statement describing how the subject authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authn_statement: Option<AuthnStatement>,

    /// Attribute statement with the resolved attributes of the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_statement: Option<AttributeStatement>,

    /// Whether this assertion has been signed.
    #[serde(skip)]
    pub signed: bool,
}

fn default_version() -> String {
    "2.0".to_string()
}

impl Assertion {
    /// Creates a new assertion.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            id: format!("_id{}", uuid::Uuid::new_v4()),
            version: "2.0".to_string(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            subject: None,
            conditions: None,
            authn_statement: None,
            attribute_statement: None,
            signed: false,
        }
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Sets the conditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Sets the authentication statement.
    #[must_use]
    pub fn with_authn_statement(mut self, statement: AuthnStatement) -> Self {
        self.authn_statement = Some(statement);
        self
    }

    /// Sets the attribute statement.
    #[must_use]
    pub fn with_attribute_statement(mut self, statement: AttributeStatement) -> Self {
        self.attribute_statement = Some(statement);
        self
    }

    /// Validates the assertion's conditions against an audience and time.
    ///
    /// # Errors
    ///
    /// Returns an error when the version is unsupported, the validity
    /// window excludes `now`, or the audience restriction does not cover
    /// `audience`.
    pub fn validate(&self, audience: &str, now: DateTime<Utc>) -> SamlResult<()> {
        if self.version != "2.0" {
            return Err(SamlError::InvalidMessage(format!(
                "unsupported SAML version: {}",
                self.version
            )));
        }

        if let Some(conditions) = &self.conditions {
            if let Some(not_before) = conditions.not_before {
                if now < not_before {
                    return Err(SamlError::AssertionNotYetValid);
                }
            }
            if let Some(not_on_or_after) = conditions.not_on_or_after {
                if now >= not_on_or_after {
                    return Err(SamlError::AssertionExpired);
                }
            }
            if !conditions.audience_restrictions.is_empty() {
                let valid = conditions
                    .audience_restrictions
                    .iter()
                    .any(|ar| ar.audiences.iter().any(|a| a == audience));
                if !valid {
                    return Err(SamlError::InvalidAudience {
                        expected: audience.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Subject of an assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Name identifier of the subject.
    pub name_id: NameId,

    /// Subject confirmations.
    #[serde(default)]
    pub confirmations: Vec<SubjectConfirmation>,
}

impl Subject {
    /// Creates a subject with no confirmations.
    #[must_use]
    pub fn new(name_id: NameId) -> Self {
        Self {
            name_id,
            confirmations: Vec::new(),
        }
    }

    /// Adds a bearer confirmation for a recipient with an expiry.
    #[must_use]
    pub fn with_bearer_confirmation(
        mut self,
        recipient: impl Into<String>,
        not_on_or_after: DateTime<Utc>,
    ) -> Self {
        self.confirmations.push(SubjectConfirmation {
            method: super::SUBJECT_CONFIRMATION_BEARER.to_string(),
            recipient: Some(recipient.into()),
            not_on_or_after: Some(not_on_or_after),
            in_response_to: None,
        });
        self
    }
}

/// Subject confirmation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectConfirmation {
    /// Confirmation method URI.
    pub method: String,

    /// Where the assertion may be delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    /// Expiry of the confirmation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Request ID this assertion responds to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,
}

/// Assertion validity conditions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conditions {
    /// Instant before which the assertion is invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// Instant at or after which the assertion is invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Audience restrictions.
    #[serde(default)]
    pub audience_restrictions: Vec<AudienceRestriction>,
}

impl Conditions {
    /// Creates conditions covering a validity window.
    #[must_use]
    pub fn window(not_before: DateTime<Utc>, not_on_or_after: DateTime<Utc>) -> Self {
        Self {
            not_before: Some(not_before),
            not_on_or_after: Some(not_on_or_after),
            audience_restrictions: Vec::new(),
        }
    }

    /// Restricts the assertion to one audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience_restrictions.push(AudienceRestriction {
            audiences: vec![audience.into()],
        });
        self
    }
}

/// One audience restriction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceRestriction {
    /// Entity IDs the assertion is addressed to.
    pub audiences: Vec<String>,
}

/// Authentication statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthnStatement {
    /// When the subject authenticated.
    pub authn_instant: DateTime<Utc>,

    /// Authentication context class URI.
    pub context_class: String,

    /// Session index at the identity provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_index: Option<String>,
}

/// Attribute statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeStatement {
    /// Attributes of the subject.
    pub attributes: Vec<SamlAttribute>,
}

/// One attribute in a statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamlAttribute {
    /// Wire attribute name (usually an OID URN).
    pub name: String,

    /// Name format URI.
    pub name_format: String,

    /// Human-readable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    /// Attribute values, already serialized for the wire.
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn assertion_with_window(issued: DateTime<Utc>) -> Assertion {
        Assertion::new("https://idp.example.edu/idp").with_conditions(
            Conditions::window(issued, issued + Duration::minutes(5))
                .with_audience("https://sp.example.org/shibboleth"),
        )
    }

    #[test]
    fn valid_window_and_audience_pass() {
        let issued = Utc::now();
        let assertion = assertion_with_window(issued);
        assert!(assertion
            .validate("https://sp.example.org/shibboleth", issued + Duration::minutes(1))
            .is_ok());
    }

    #[test]
    fn expired_assertion_is_rejected() {
        let issued = Utc::now();
        let assertion = assertion_with_window(issued);
        let result = assertion.validate(
            "https://sp.example.org/shibboleth",
            issued + Duration::minutes(6),
        );
        assert!(matches!(result, Err(SamlError::AssertionExpired)));
    }

    #[test]
    fn future_assertion_is_rejected() {
        let issued = Utc::now();
        let assertion = assertion_with_window(issued + Duration::minutes(5));
        let result = assertion.validate(
            "https://sp.example.org/shibboleth",
            issued,
        );
        assert!(matches!(result, Err(SamlError::AssertionNotYetValid)));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let issued = Utc::now();
        let assertion = assertion_with_window(issued);
        let result = assertion.validate("https://other.example.org", issued);
        assert!(matches!(result, Err(SamlError::InvalidAudience { .. })));
    }

    #[test]
    fn assertion_ids_are_unique() {
        let a = Assertion::new("https://idp.example.edu/idp");
        let b = Assertion::new("https://idp.example.edu/idp");
        assert_ne!(a.id, b.id);
    }
}
