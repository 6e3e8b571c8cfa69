//! In-memory connectors for tests and for running without Azure credentials.

use crate::secure_string::SecureString;
use crate::traits::{
    Connector, ConnectorError, ConnectorHealth, ConnectorResult, DeviceManagement, DirectoryUser,
    ManagedDevice, SecretStore, UserDirectory,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MockUserDirectory {
    users: Arc<RwLock<Vec<DirectoryUser>>>,
}

impl MockUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_sample_data() -> Self {
        let user = |id: &str, name: &str, upn: &str, department: &str| DirectoryUser {
            id: id.to_string(),
            display_name: Some(name.to_string()),
            user_principal_name: Some(upn.to_string()),
            mail: Some(upn.to_string()),
            job_title: None,
            department: Some(department.to_string()),
            office_location: Some("Gemeentehuis".to_string()),
            account_enabled: Some(true),
        };
        Self {
            users: Arc::new(RwLock::new(vec![
                user("u-001", "Jan Peeters", "jan.peeters@diepenbeek.be", "ICT"),
                user("u-002", "An Janssens", "an.janssens@diepenbeek.be", "Burgerzaken"),
                user("u-003", "Els Claes", "els.claes@diepenbeek.be", "Financien"),
            ])),
        }
    }

    pub async fn add_user(&self, user: DirectoryUser) {
        self.users.write().await.push(user);
    }
}

impl Default for MockUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn starts_with_ci(value: Option<&str>, prefix: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase().starts_with(prefix))
}

#[async_trait]
impl Connector for MockUserDirectory {
    fn name(&self) -> &str {
        "mock-users"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        Ok(ConnectorHealth::Healthy)
    }
}

#[async_trait]
impl UserDirectory for MockUserDirectory {
    async fn search_users(&self, query: &str, limit: usize) -> ConnectorResult<Vec<DirectoryUser>> {
        let q = query.trim().to_lowercase();
        if q.chars().count() < crate::graph::MIN_SEARCH_LENGTH {
            return Ok(Vec::new());
        }
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| {
                starts_with_ci(u.display_name.as_deref(), &q)
                    || starts_with_ci(u.mail.as_deref(), &q)
                    || starts_with_ci(u.user_principal_name.as_deref(), &q)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_user(&self, id_or_upn: &str) -> ConnectorResult<DirectoryUser> {
        let users = self.users.read().await;
        users
            .iter()
            .find(|u| {
                u.id == id_or_upn
                    || u
                        .user_principal_name
                        .as_deref()
                        .is_some_and(|upn| upn.eq_ignore_ascii_case(id_or_upn))
            })
            .cloned()
            .ok_or_else(|| ConnectorError::NotFound(format!("User '{}' not found", id_or_upn)))
    }
}

pub struct MockDeviceManagement {
    devices: Arc<RwLock<Vec<ManagedDevice>>>,
}

impl MockDeviceManagement {
    pub fn new() -> Self {
        Self {
            devices: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_sample_data() -> Self {
        let device = |id: &str, name: &str, serial: &str, upn: &str| ManagedDevice {
            id: id.to_string(),
            device_name: Some(name.to_string()),
            serial_number: Some(serial.to_string()),
            manufacturer: Some("HP".to_string()),
            model: Some("EliteBook 840 G10".to_string()),
            operating_system: Some("Windows".to_string()),
            os_version: Some("10.0.22631".to_string()),
            user_principal_name: Some(upn.to_string()),
            user_display_name: None,
            compliance_state: Some("compliant".to_string()),
            enrolled_date_time: Some(Utc::now()),
            last_sync_date_time: Some(Utc::now()),
        };
        Self {
            devices: Arc::new(RwLock::new(vec![
                device("dev-001", "DIEP-LAP-001", "5CD1234XYZ", "jan.peeters@diepenbeek.be"),
                device("dev-002", "DIEP-LAP-002", "5CD5678ABC", "an.janssens@diepenbeek.be"),
            ])),
        }
    }

    pub async fn add_device(&self, device: ManagedDevice) {
        self.devices.write().await.push(device);
    }
}

impl Default for MockDeviceManagement {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MockDeviceManagement {
    fn name(&self) -> &str {
        "mock-intune"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        Ok(ConnectorHealth::Healthy)
    }
}

#[async_trait]
impl DeviceManagement for MockDeviceManagement {
    async fn find_by_serial(&self, serial_number: &str) -> ConnectorResult<Vec<ManagedDevice>> {
        let devices = self.devices.read().await;
        Ok(devices
            .iter()
            .filter(|d| {
                d.serial_number
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(serial_number.trim()))
            })
            .cloned()
            .collect())
    }

    async fn devices_for_user(
        &self,
        user_principal_name: &str,
    ) -> ConnectorResult<Vec<ManagedDevice>> {
        let devices = self.devices.read().await;
        Ok(devices
            .iter()
            .filter(|d| {
                d.user_principal_name
                    .as_deref()
                    .is_some_and(|u| u.eq_ignore_ascii_case(user_principal_name))
            })
            .cloned()
            .collect())
    }

    async fn get_device(&self, device_id: &str) -> ConnectorResult<ManagedDevice> {
        self.devices
            .read()
            .await
            .iter()
            .find(|d| d.id == device_id)
            .cloned()
            .ok_or_else(|| ConnectorError::NotFound(format!("Device '{}' not found", device_id)))
    }
}

#[derive(Default)]
pub struct MockSecretStore {
    secrets: HashMap<String, SecureString>,
}

impl MockSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, name: &str, value: &str) -> Self {
        self.secrets.insert(name.to_string(), SecureString::from(value));
        self
    }
}

#[async_trait]
impl SecretStore for MockSecretStore {
    async fn list_secrets(&self) -> ConnectorResult<Vec<String>> {
        let mut names: Vec<String> = self.secrets.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn get_secret(&self, name: &str) -> ConnectorResult<SecureString> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| ConnectorError::NotFound(format!("Secret '{}' not found", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_search_by_prefix() {
        let directory = MockUserDirectory::with_sample_data();
        let found = directory.search_users("jan", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "u-001");

        let by_mail = directory.search_users("an.j", 10).await.unwrap();
        assert_eq!(by_mail[0].id, "u-002");

        assert!(directory.search_users("j", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_user_by_upn() {
        let directory = MockUserDirectory::with_sample_data();
        let user = directory.get_user("Els.Claes@diepenbeek.be").await.unwrap();
        assert_eq!(user.id, "u-003");
        assert!(matches!(
            directory.get_user("nobody@diepenbeek.be").await,
            Err(ConnectorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_device_lookups() {
        let intune = MockDeviceManagement::with_sample_data();
        assert_eq!(intune.find_by_serial("5cd1234xyz").await.unwrap().len(), 1);
        assert_eq!(
            intune
                .devices_for_user("an.janssens@diepenbeek.be")
                .await
                .unwrap()[0]
                .id,
            "dev-002"
        );
        assert!(intune.get_device("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_secret_store() {
        let store = MockSecretStore::new()
            .with_secret("Graph--ClientSecret", "abc")
            .with_secret("Database--Url", "sqlite::memory:");
        assert_eq!(
            store.list_secrets().await.unwrap(),
            vec!["Database--Url", "Graph--ClientSecret"]
        );
        assert_eq!(
            store.get_secret("Graph--ClientSecret").await.unwrap().expose_secret(),
            "abc"
        );
    }
}
