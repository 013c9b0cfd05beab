//! SAML constants and attribute name mappings.

/// SAML 2.0 assertion namespace.
pub const NS_ASSERTION: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace.
pub const NS_PROTOCOL: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// URI name format for attribute names.
pub const NAME_FORMAT_URI: &str = "urn:oasis:names:tc:SAML:2.0:attrname-format:uri";

/// Bearer subject confirmation method.
pub const SUBJECT_CONFIRMATION_BEARER: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";

// OIDs from the eduPerson (202208) specification and inetOrgPerson.
const OID_TABLE: &[(&str, &str)] = &[
    ("eduPersonPrincipalName", "urn:oid:1.3.6.1.4.1.5923.1.1.1.6"),
    ("eduPersonScopedAffiliation", "urn:oid:1.3.6.1.4.1.5923.1.1.1.9"),
    ("eduPersonAffiliation", "urn:oid:1.3.6.1.4.1.5923.1.1.1.1"),
    ("eduPersonEntitlement", "urn:oid:1.3.6.1.4.1.5923.1.1.1.7"),
    ("eduPersonTargetedID", "urn:oid:1.3.6.1.4.1.5923.1.1.1.10"),
    ("mail", "urn:oid:0.9.2342.19200300.100.1.3"),
    ("displayName", "urn:oid:2.16.840.1.113730.3.1.241"),
    ("givenName", "urn:oid:2.5.4.42"),
    ("sn", "urn:oid:2.5.4.4"),
    ("cn", "urn:oid:2.5.4.3"),
    ("uid", "urn:oid:0.9.2342.19200300.100.1.1"),
];

/// Returns the wire OID for a friendly attribute name, if known.
#[must_use]
pub fn attribute_oid(friendly_name: &str) -> Option<&'static str> {
    OID_TABLE
        .iter()
        .find(|(name, _)| *name == friendly_name)
        .map(|(_, oid)| *oid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_attributes_map_to_oids() {
        assert_eq!(
            attribute_oid("eduPersonPrincipalName"),
            Some("urn:oid:1.3.6.1.4.1.5923.1.1.1.6")
        );
        assert_eq!(attribute_oid("mail"), Some("urn:oid:0.9.2342.19200300.100.1.3"));
    }

    #[test]
    fn unknown_attributes_have_no_oid() {
        assert_eq!(attribute_oid("favoriteColor"), None);
    }
}
