//! Azure Key Vault secrets client.
//!
//! Secret names cannot contain `:` or `.`, so nested configuration keys are
//! stored with `--` between sections: `Graph--ClientSecret` holds
//! `Graph:ClientSecret`, i.e. the `graph.client_secret` setting.

use crate::graph::{token_url, DEFAULT_AUTHORITY_HOST};
use crate::http::HttpClient;
use crate::secure_string::SecureString;
use crate::traits::{
    AuthConfig, ConnectorConfig, ConnectorError, ConnectorResult, SecretStore,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

const API_VERSION: &str = "7.4";
const VAULT_SCOPE: &str = "https://vault.azure.net/.default";
const MAX_PAGES: usize = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyVaultConfig {
    /// e.g. `https://djoppie-kv.vault.azure.net`. Empty disables Key Vault.
    pub url: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecureString,
    pub authority_host: Option<String>,
}

impl KeyVaultConfig {
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

pub struct KeyVaultClient {
    client: HttpClient,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretList {
    value: Vec<SecretItem>,
    next_link: Option<String>,
}

#[derive(Deserialize)]
struct SecretItem {
    id: String,
    #[serde(default)]
    attributes: SecretAttributes,
}

#[derive(Deserialize)]
struct SecretAttributes {
    #[serde(default = "enabled_default")]
    enabled: bool,
}

impl Default for SecretAttributes {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn enabled_default() -> bool {
    true
}

#[derive(Deserialize)]
struct SecretBundle {
    value: String,
}

impl KeyVaultClient {
    pub fn new(config: &KeyVaultConfig) -> ConnectorResult<Self> {
        if !config.is_enabled() {
            return Err(ConnectorError::NotConfigured("key_vault.url is not set".into()));
        }
        if config.tenant_id.trim().is_empty()
            || config.client_id.trim().is_empty()
            || config.client_secret.is_empty()
        {
            return Err(ConnectorError::NotConfigured(
                "key_vault requires tenant_id, client_id and client_secret".into(),
            ));
        }

        let authority = config
            .authority_host
            .as_deref()
            .unwrap_or(DEFAULT_AUTHORITY_HOST);
        let connector = ConnectorConfig::new(
            "key-vault",
            config.url.trim_end_matches('/'),
            AuthConfig::OAuth2 {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                token_url: token_url(authority, &config.tenant_id),
                scopes: vec![VAULT_SCOPE.to_string()],
            },
        );
        info!(vault = %config.url, "Key Vault client initialized");
        Ok(Self {
            client: HttpClient::new(connector)?,
        })
    }
}

#[async_trait]
impl SecretStore for KeyVaultClient {
    #[instrument(skip(self))]
    async fn list_secrets(&self) -> ConnectorResult<Vec<String>> {
        let mut path = format!("/secrets?api-version={}", API_VERSION);
        let mut names = Vec::new();
        for _ in 0..MAX_PAGES {
            let page: SecretList = self.client.get_json(&path).await?;
            names.extend(
                page.value
                    .into_iter()
                    .filter(|item| item.attributes.enabled)
                    .filter_map(|item| secret_name_from_id(&item.id)),
            );
            match page.next_link {
                Some(next) => path = next,
                None => break,
            }
        }
        debug!(count = names.len(), "Listed Key Vault secrets");
        Ok(names)
    }

    #[instrument(skip(self))]
    async fn get_secret(&self, name: &str) -> ConnectorResult<SecureString> {
        if !is_valid_secret_name(name) {
            return Err(ConnectorError::InvalidRequest(format!(
                "Invalid secret name '{}'",
                name
            )));
        }
        let bundle: SecretBundle = self
            .client
            .get_json(&format!("/secrets/{}?api-version={}", name, API_VERSION))
            .await?;
        Ok(SecureString::new(bundle.value))
    }
}

/// Key Vault allows 1-127 characters of `[0-9a-zA-Z-]`.
pub fn is_valid_secret_name(name: &str) -> bool {
    (1..=127).contains(&name.len()) && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// `https://vault/secrets/Name` or `https://vault/secrets/Name/version` to `Name`.
fn secret_name_from_id(id: &str) -> Option<String> {
    let rest = id.split("/secrets/").nth(1)?;
    rest.split('/')
        .next()
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// `Graph--ClientSecret` to `Graph:ClientSecret`.
pub fn secret_name_to_config_key(name: &str) -> String {
    name.replace("--", ":")
}

/// `Graph--ClientSecret` to `graph.client_secret`.
///
/// Each section is converted from PascalCase to snake_case; single dashes
/// become underscores.
pub fn secret_name_to_config_path(name: &str) -> String {
    name.split("--")
        .map(snake_case)
        .collect::<Vec<_>>()
        .join(".")
}

fn snake_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 4);
    let mut prev_lower = false;
    for c in segment.chars() {
        if c == '-' {
            out.push('_');
            prev_lower = false;
        } else if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_name_mapping() {
        assert_eq!(
            secret_name_to_config_key("Graph--ClientSecret"),
            "Graph:ClientSecret"
        );
        assert_eq!(
            secret_name_to_config_path("Graph--ClientSecret"),
            "graph.client_secret"
        );
        assert_eq!(
            secret_name_to_config_path("Database--Url"),
            "database.url"
        );
        assert_eq!(
            secret_name_to_config_path("Auth--TenantId"),
            "auth.tenant_id"
        );
        assert_eq!(secret_name_to_config_path("AzureAD--ClientId"), "azure_ad.client_id");
    }

    #[test]
    fn test_secret_name_from_id() {
        assert_eq!(
            secret_name_from_id("https://kv.vault.azure.net/secrets/Graph--ClientSecret"),
            Some("Graph--ClientSecret".to_string())
        );
        assert_eq!(
            secret_name_from_id("https://kv.vault.azure.net/secrets/Db--Url/abc123"),
            Some("Db--Url".to_string())
        );
        assert_eq!(secret_name_from_id("https://kv.vault.azure.net/keys/x"), None);
    }

    #[test]
    fn test_secret_name_validation() {
        assert!(is_valid_secret_name("Graph--ClientSecret"));
        assert!(!is_valid_secret_name("graph.client_secret"));
        assert!(!is_valid_secret_name("../x"));
        assert!(!is_valid_secret_name(""));
    }

    #[test]
    fn test_disabled_without_url() {
        assert!(matches!(
            KeyVaultClient::new(&KeyVaultConfig::default()),
            Err(ConnectorError::NotConfigured(_))
        ));
    }
}
