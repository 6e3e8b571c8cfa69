//! Microsoft Graph clients.
//!
//! Both the user directory and the Intune client authenticate as the same
//! Entra ID app registration using the client-credentials flow.

mod intune;
mod users;

pub use intune::IntuneConnector;
pub use users::{GraphUserConnector, MAX_SEARCH_RESULTS, MIN_SEARCH_LENGTH};

use crate::secure_string::SecureString;
use crate::traits::{AuthConfig, ConnectorConfig, ConnectorError, ConnectorResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// App registration used to call Graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecureString,
    pub base_url: String,
    pub authority_host: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: SecureString::default(),
            base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl GraphConfig {
    /// Tenant, client id and secret are all set.
    pub fn is_configured(&self) -> bool {
        !self.tenant_id.trim().is_empty()
            && !self.client_id.trim().is_empty()
            && !self.client_secret.is_empty()
    }

    pub fn token_url(&self) -> String {
        token_url(&self.authority_host, &self.tenant_id)
    }

    pub(crate) fn connector_config(&self, name: &str) -> ConnectorResult<ConnectorConfig> {
        if !self.is_configured() {
            return Err(ConnectorError::NotConfigured(
                "graph.tenant_id, graph.client_id and graph.client_secret are required".into(),
            ));
        }
        let mut config = ConnectorConfig::new(
            name,
            self.base_url.clone(),
            AuthConfig::OAuth2 {
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
                token_url: self.token_url(),
                scopes: vec![GRAPH_SCOPE.to_string()],
            },
        );
        config.timeout_secs = self.timeout_secs;
        config.max_retries = self.max_retries;
        Ok(config)
    }
}

pub(crate) fn token_url(authority_host: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        tenant_id.trim()
    )
}

/// Collection envelope returned by Graph list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphList<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Counts a lookup in `graph_lookups_total` by operation and outcome.
pub(crate) fn record_lookup<T>(operation: &'static str, result: &ConnectorResult<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(ConnectorError::NotFound(_)) => "not_found",
        Err(_) => "error",
    };
    metrics::counter!("graph_lookups_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_graph() {
        let config = GraphConfig::default();
        assert!(!config.is_configured());
        assert!(matches!(
            config.connector_config("graph"),
            Err(ConnectorError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_connector_config_uses_client_credentials() {
        let config = GraphConfig {
            tenant_id: "contoso-tenant".into(),
            client_id: "app-id".into(),
            client_secret: "secret".into(),
            ..Default::default()
        };
        let connector = config.connector_config("graph").unwrap();
        match connector.auth {
            AuthConfig::OAuth2 {
                token_url, scopes, ..
            } => {
                assert_eq!(
                    token_url,
                    "https://login.microsoftonline.com/contoso-tenant/oauth2/v2.0/token"
                );
                assert_eq!(scopes, vec![GRAPH_SCOPE.to_string()]);
            }
            other => panic!("unexpected auth {:?}", other),
        }
    }

    #[test]
    fn test_list_envelope() {
        let list: GraphList<serde_json::Value> = serde_json::from_str(
            r#"{"value":[{"id":"1"}],"@odata.nextLink":"https://graph.microsoft.com/v1.0/users?$skiptoken=a"}"#,
        )
        .unwrap();
        assert_eq!(list.value.len(), 1);
        assert!(list.next_link.is_some());
    }
}
