//! The LDAP data connector.

use std::time::Duration;

use async_trait::async_trait;
use fedid_model::{AttributeSet, AttributeValue, ResolutionContext};
use fedid_spi::{
    DataConnector, Dependencies, PluginConfig, PluginRegistry, PluginSettings, SpiError,
    SpiResult, PRINCIPAL_TOKEN,
};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry, SearchOptions};

use crate::config::{ldap_escape, LdapConnectorOptions};
use crate::error::{LdapConnectorError, LdapConnectorResult};

/// Data connector backed by an LDAP directory.
///
/// A directory context is opened, bound, used, and unbound within each
/// resolve call; nothing is held across requests.
pub struct LdapDataConnector {
    config: PluginConfig,
    options: LdapConnectorOptions,
}

impl std::fmt::Debug for LdapDataConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDataConnector")
            .field("config", &self.config)
            .field("url", &self.options.url)
            .field("base_dn", &self.options.base_dn)
            .finish_non_exhaustive()
    }
}

impl LdapDataConnector {
    /// Builds the connector from settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid settings, including any
    /// non-LDAPS URL.
    pub fn from_settings(settings: &PluginSettings) -> SpiResult<Self> {
        let config = PluginConfig::from_settings(settings)?;
        let options: LdapConnectorOptions = settings.typed_options()?;
        options
            .validate()
            .map_err(|e| SpiError::config(format!("plugin {}: {e}", config.id())))?;
        Ok(Self { config, options })
    }

    /// Opens and binds a fresh directory connection.
    async fn connect(&self) -> LdapConnectorResult<Ldap> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.options.connect_timeout_secs));

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.options.url)
            .await
            .map_err(|e| LdapConnectorError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!(error = %e, "LDAP connection driver error");
            }
        });

        ldap.simple_bind(&self.options.bind_dn, &self.options.bind_credential)
            .await
            .map_err(|e| LdapConnectorError::Connection(e.to_string()))?
            .success()
            .map_err(|e| LdapConnectorError::Connection(format!("bind failed: {e}")))?;

        Ok(ldap)
    }

    fn filter_for(&self, principal: &str) -> String {
        self.options
            .filter
            .replace(PRINCIPAL_TOKEN, &ldap_escape(principal))
    }

    /// One connect-search-unbind cycle.
    async fn search_once(&self, principal: &str) -> LdapConnectorResult<AttributeSet> {
        let mut ldap = self.connect().await?;

        let attrs: Vec<&str> = if self.options.attributes.is_empty() {
            vec!["*"]
        } else {
            self.options.attributes.iter().map(String::as_str).collect()
        };

        let search_result = ldap
            .with_search_options(
                SearchOptions::new().timelimit(self.options.time_limit_secs),
            )
            .search(
                &self.options.base_dn,
                Scope::Subtree,
                &self.filter_for(principal),
                attrs,
            )
            .await;

        // The context is closed regardless of the search outcome.
        let unbind = ldap.unbind().await;
        if let Err(e) = unbind {
            tracing::debug!(error = %e, "LDAP unbind failed");
        }

        let (entries, _res) = search_result
            .map_err(|e| LdapConnectorError::Search(e.to_string()))?
            .success()
            .map_err(|e| LdapConnectorError::Search(e.to_string()))?;

        if entries.len() > 1 {
            return Err(LdapConnectorError::AmbiguousEntry(entries.len()));
        }
        match entries.into_iter().next() {
            Some(entry) => Ok(entry_to_attribute_set(SearchEntry::construct(entry))),
            None => Err(LdapConnectorError::NoEntry),
        }
    }

    /// Searches with one transparent retry on a connection-class error.
    async fn search(&self, principal: &str) -> LdapConnectorResult<AttributeSet> {
        match self.search_once(principal).await {
            Ok(set) => Ok(set),
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    plugin_id = %self.config.id(),
                    error = %e,
                    "directory communication failed, retrying once on a fresh connection"
                );
                self.search_once(principal).await
            }
            Err(e) => Err(e),
        }
    }
}

fn entry_to_attribute_set(entry: SearchEntry) -> AttributeSet {
    let mut set = AttributeSet::new();
    for (name, values) in entry.attrs {
        set.insert(
            name,
            values.into_iter().map(AttributeValue::Text).collect(),
        );
    }
    for (name, values) in entry.bin_attrs {
        for value in values {
            set.add(name.clone(), AttributeValue::Bytes(value));
        }
    }
    set
}

#[async_trait]
impl DataConnector for LdapDataConnector {
    fn config(&self) -> &PluginConfig {
        &self.config
    }

    async fn resolve(
        &self,
        ctx: &ResolutionContext,
        _deps: &Dependencies,
    ) -> SpiResult<AttributeSet> {
        self.search(&ctx.principal)
            .await
            .map_err(|e| SpiError::resolution(self.config.id(), e.to_string()))
    }

    /// Startup connectivity check: connect, bind, unbind.
    async fn test_connection(&self) -> SpiResult<()> {
        let mut ldap = self
            .connect()
            .await
            .map_err(|e| SpiError::resolution(self.config.id(), e.to_string()))?;
        let _ = ldap.unbind().await;
        Ok(())
    }
}

/// Registers the `ldap` connector type.
pub fn register_ldap_connector(registry: &PluginRegistry) {
    registry.register_connector("ldap", |settings| {
        Ok(Box::new(LdapDataConnector::from_settings(settings)?) as Box<dyn DataConnector>)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: &str) -> PluginSettings {
        PluginSettings::new("dir", "ldap").with_options(&LdapConnectorOptions {
            url: url.to_string(),
            bind_dn: "cn=idp,ou=services,dc=example,dc=edu".to_string(),
            bind_credential: "password".to_string(),
            base_dn: "ou=people,dc=example,dc=edu".to_string(),
            filter: "(uid=%PRINCIPAL%)".to_string(),
            ..LdapConnectorOptions::default()
        })
    }

    #[test]
    fn construction_rejects_plain_ldap() {
        let result = LdapDataConnector::from_settings(&settings("ldap://ldap.example.edu:389"));
        assert!(matches!(result, Err(SpiError::Configuration(_))));
    }

    #[test]
    fn construction_accepts_ldaps() {
        let connector =
            LdapDataConnector::from_settings(&settings("ldaps://ldap.example.edu:636")).unwrap();
        assert_eq!(connector.config().id(), "dir");
    }

    #[test]
    fn principal_is_escaped_in_the_filter() {
        let connector =
            LdapDataConnector::from_settings(&settings("ldaps://ldap.example.edu:636")).unwrap();

        // A principal with filter metacharacters cannot break out of the
        // filter expression.
        let filter = connector.filter_for("jdoe)(objectClass=*");
        assert_eq!(filter, "(uid=jdoe\\29\\28objectClass=\\2a)");
    }

    #[test]
    fn binary_attributes_become_byte_values() {
        let entry = SearchEntry {
            dn: "uid=jdoe,ou=people,dc=example,dc=edu".to_string(),
            attrs: [("mail".to_string(), vec!["jdoe@example.edu".to_string()])]
                .into_iter()
                .collect(),
            bin_attrs: [("jpegPhoto".to_string(), vec![vec![0xff, 0xd8]])]
                .into_iter()
                .collect(),
        };

        let set = entry_to_attribute_set(entry);
        assert_eq!(set.get("mail").unwrap()[0].as_text(), Some("jdoe@example.edu"));
        assert_eq!(
            set.get("jpegPhoto").unwrap()[0].as_bytes(),
            Some(&[0xff, 0xd8][..])
        );
    }
}
