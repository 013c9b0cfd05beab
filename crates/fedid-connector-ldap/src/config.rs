//! LDAP connector configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LdapConnectorError, LdapConnectorResult};

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_time_limit_secs() -> i32 {
    10
}

/// Options for the LDAP data connector.
///
/// The `url` MUST use the `ldaps://` scheme; `ldap://` and STARTTLS are
/// rejected at validation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConnectorOptions {
    /// Directory URL (must be ldaps://).
    pub url: String,

    /// Bind DN for the service account.
    pub bind_dn: String,

    /// Bind credential. Never serialized back out.
    #[serde(skip_serializing, default)]
    pub bind_credential: String,

    /// Base DN searches start from.
    pub base_dn: String,

    /// Search filter template; `%PRINCIPAL%` is replaced with the
    /// (LDAP-escaped) principal name.
    pub filter: String,

    /// Attributes requested from the directory. Empty means all.
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Server-side search time limit in seconds.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: i32,
}

impl Default for LdapConnectorOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            bind_dn: String::new(),
            bind_credential: String::new(),
            base_dn: String::new(),
            filter: String::new(),
            attributes: Vec::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
            time_limit_secs: default_time_limit_secs(),
        }
    }
}

impl LdapConnectorOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns `InsecureProtocol` for a non-LDAPS URL and configuration
    /// errors for missing fields.
    pub fn validate(&self) -> LdapConnectorResult<()> {
        let url_lower = self.url.to_lowercase();
        if !url_lower.starts_with("ldaps://") {
            return Err(LdapConnectorError::InsecureProtocol);
        }
        if self.url.len() <= 8 {
            return Err(LdapConnectorError::config("invalid LDAPS URL: missing host"));
        }
        if self.bind_dn.is_empty() {
            return Err(LdapConnectorError::config("bind_dn cannot be empty"));
        }
        if self.base_dn.is_empty() {
            return Err(LdapConnectorError::config("base_dn cannot be empty"));
        }
        if self.filter.is_empty() {
            return Err(LdapConnectorError::config("filter cannot be empty"));
        }
        Ok(())
    }
}

/// Escapes special characters in LDAP filter values.
#[must_use]
pub fn ldap_escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\5c"),
            '*' => result.push_str("\\2a"),
            '(' => result.push_str("\\28"),
            ')' => result.push_str("\\29"),
            '\0' => result.push_str("\\00"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> LdapConnectorOptions {
        LdapConnectorOptions {
            url: "ldaps://ldap.example.edu:636".to_string(),
            bind_dn: "cn=idp,ou=services,dc=example,dc=edu".to_string(),
            bind_credential: "password".to_string(),
            base_dn: "ou=people,dc=example,dc=edu".to_string(),
            filter: "(uid=%PRINCIPAL%)".to_string(),
            ..LdapConnectorOptions::default()
        }
    }

    #[test]
    fn rejects_plain_ldap_url() {
        let mut opts = options();
        opts.url = "ldap://ldap.example.edu:389".to_string();
        assert!(matches!(
            opts.validate(),
            Err(LdapConnectorError::InsecureProtocol)
        ));
    }

    #[test]
    fn accepts_ldaps_url() {
        assert!(options().validate().is_ok());
    }

    #[test]
    fn missing_filter_is_rejected() {
        let mut opts = options();
        opts.filter.clear();
        assert!(matches!(
            opts.validate(),
            Err(LdapConnectorError::Configuration(_))
        ));
    }

    #[test]
    fn escape_covers_filter_metacharacters() {
        assert_eq!(ldap_escape("john*"), "john\\2a");
        assert_eq!(ldap_escape("(admin)"), "\\28admin\\29");
        assert_eq!(ldap_escape("user\\name"), "user\\5cname");
        assert_eq!(ldap_escape("normal"), "normal");
    }
}
