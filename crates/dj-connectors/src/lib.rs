//! # dj-connectors
//!
//! Clients for the Microsoft services Djoppie Inventory talks to.
//!
//! Graph provides user lookup for asset owners and Intune device data. Key
//! Vault supplies configuration secrets. All of them share one HTTP client
//! with token caching, retries and rate limiting.

pub mod graph;
pub mod http;
pub mod key_vault;
pub mod mock;
pub mod secure_string;
pub mod traits;

pub use graph::{GraphConfig, GraphUserConnector, IntuneConnector};
pub use key_vault::{
    secret_name_to_config_key, secret_name_to_config_path, KeyVaultClient, KeyVaultConfig,
};
pub use mock::{MockDeviceManagement, MockSecretStore, MockUserDirectory};
pub use secure_string::SecureString;
pub use traits::{
    AuthConfig, Connector, ConnectorConfig, ConnectorError, ConnectorHealth, ConnectorResult,
    DeviceManagement, DirectoryUser, ManagedDevice, SecretStore, UserDirectory,
};
