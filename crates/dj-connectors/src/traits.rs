//! Connector interfaces and the data they return.
//!
//! Every external lookup the inventory makes goes through one of these
//! traits so the API can swap in mocks when Azure is not configured.

use crate::secure_string::SecureString;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur in connectors.
#[derive(Error, Debug, Clone)]
pub enum ConnectorError {
    #[error("Connector not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConnectorError {
    /// True for failures on the remote side, as opposed to bad input or
    /// missing configuration.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ConnectorError::AuthenticationFailed(_)
                | ConnectorError::AuthorizationDenied(_)
                | ConnectorError::ConnectionFailed(_)
                | ConnectorError::RequestFailed(_)
                | ConnectorError::RateLimited(_)
                | ConnectorError::InvalidResponse(_)
                | ConnectorError::Timeout(_)
        )
    }
}

impl From<dj_core::validation::ValidationError> for ConnectorError {
    fn from(err: dj_core::validation::ValidationError) -> Self {
        ConnectorError::InvalidRequest(err.to_string())
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorHealth {
    Healthy,
    Degraded(String),
    Unhealthy(String),
    Unknown,
}

/// Transport settings shared by every HTTP connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Used in logs and metrics labels.
    pub name: String,
    pub base_url: String,
    pub auth: AuthConfig,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub verify_tls: bool,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl ConnectorConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, auth: AuthConfig) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth,
            timeout_secs: 30,
            max_retries: 3,
            verify_tls: true,
            headers: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    None,
    BearerToken {
        token: SecureString,
    },
    /// OAuth2 client-credentials grant, as used by Entra ID app registrations.
    OAuth2 {
        client_id: String,
        client_secret: SecureString,
        token_url: String,
        scopes: Vec<String>,
    },
}

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    fn name(&self) -> &str;

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth>;
}

/// A person in the organization directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: String,
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
    pub mail: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub office_location: Option<String>,
    #[serde(default)]
    pub account_enabled: Option<bool>,
}

/// Read-only access to the organization's users.
#[async_trait]
pub trait UserDirectory: Connector {
    /// Users whose display name, mail or UPN starts with `query`.
    async fn search_users(&self, query: &str, limit: usize) -> ConnectorResult<Vec<DirectoryUser>>;

    /// Looks a user up by object id or UPN.
    async fn get_user(&self, id_or_upn: &str) -> ConnectorResult<DirectoryUser>;
}

/// A device enrolled in Intune.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDevice {
    pub id: String,
    pub device_name: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub operating_system: Option<String>,
    pub os_version: Option<String>,
    pub user_principal_name: Option<String>,
    pub user_display_name: Option<String>,
    pub compliance_state: Option<String>,
    pub enrolled_date_time: Option<DateTime<Utc>>,
    pub last_sync_date_time: Option<DateTime<Utc>>,
}

/// Read-only access to Intune managed devices.
#[async_trait]
pub trait DeviceManagement: Connector {
    async fn find_by_serial(&self, serial_number: &str) -> ConnectorResult<Vec<ManagedDevice>>;

    async fn devices_for_user(&self, user_principal_name: &str)
        -> ConnectorResult<Vec<ManagedDevice>>;

    async fn get_device(&self, device_id: &str) -> ConnectorResult<ManagedDevice>;
}

/// Read access to a secret store such as Azure Key Vault.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Names of the enabled secrets.
    async fn list_secrets(&self) -> ConnectorResult<Vec<String>>;

    async fn get_secret(&self, name: &str) -> ConnectorResult<SecureString>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        assert!(ConnectorError::Timeout("x".into()).is_upstream());
        assert!(ConnectorError::RateLimited(5).is_upstream());
        assert!(!ConnectorError::NotConfigured("graph".into()).is_upstream());
        assert!(!ConnectorError::NotFound("user".into()).is_upstream());
        assert!(!ConnectorError::InvalidRequest("bad".into()).is_upstream());
    }

    #[test]
    fn test_managed_device_deserializes_graph_payload() {
        let json = r#"{
            "id": "d1",
            "deviceName": "DIEP-LAP-001",
            "serialNumber": "5CD1234XYZ",
            "manufacturer": "HP",
            "model": "EliteBook 840 G10",
            "operatingSystem": "Windows",
            "osVersion": "10.0.22631",
            "userPrincipalName": "jan.peeters@diepenbeek.be",
            "complianceState": "compliant",
            "lastSyncDateTime": "2025-01-10T08:30:00Z"
        }"#;
        let device: ManagedDevice = serde_json::from_str(json).unwrap();
        assert_eq!(device.serial_number.as_deref(), Some("5CD1234XYZ"));
        assert!(device.last_sync_date_time.is_some());
        assert!(device.enrolled_date_time.is_none());
    }

    #[test]
    fn test_auth_config_tagged() {
        let auth: AuthConfig = serde_json::from_str(r#"{"type":"none"}"#).unwrap();
        assert!(matches!(auth, AuthConfig::None));
    }
}
