//! Intune managed-device lookups via Graph `/deviceManagement/managedDevices`.

use super::{record_lookup, GraphConfig, GraphList};
use crate::http::{HttpClient, RateLimitConfig};
use crate::traits::{
    Connector, ConnectorError, ConnectorHealth, ConnectorResult, DeviceManagement, ManagedDevice,
};
use async_trait::async_trait;
use dj_core::validation::ODataSanitizer;
use tracing::{debug, instrument, warn};

const DEVICE_FIELDS: &str = "id,deviceName,serialNumber,manufacturer,model,operatingSystem,osVersion,userPrincipalName,userDisplayName,complianceState,enrolledDateTime,lastSyncDateTime";

/// Pages followed before a listing is cut off.
const MAX_PAGES: usize = 10;

pub struct IntuneConnector {
    client: HttpClient,
}

impl IntuneConnector {
    pub fn new(config: &GraphConfig) -> ConnectorResult<Self> {
        let client = HttpClient::with_rate_limit(
            config.connector_config("intune")?,
            Some(RateLimitConfig::default()),
        )?;
        Ok(Self { client })
    }

    /// `$filter` matching one property exactly.
    pub fn equals_filter(property: &str, value: &str) -> ConnectorResult<String> {
        Ok(format!(
            "{} eq {}",
            property,
            ODataSanitizer::quote(property, value)?
        ))
    }

    async fn list(&self, filter: &str) -> ConnectorResult<Vec<ManagedDevice>> {
        let mut path = format!(
            "/deviceManagement/managedDevices?$filter={}&$select={}",
            urlencoding::encode(filter),
            DEVICE_FIELDS
        );
        let mut devices = Vec::new();
        for _ in 0..MAX_PAGES {
            let page: GraphList<ManagedDevice> = self.client.get_json(&path).await?;
            devices.extend(page.value);
            match page.next_link {
                Some(next) => path = next,
                None => return Ok(devices),
            }
        }
        warn!(filter, count = devices.len(), "Managed device listing truncated");
        Ok(devices)
    }
}

#[async_trait]
impl Connector for IntuneConnector {
    fn name(&self) -> &str {
        self.client.name()
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        match self
            .client
            .get("/deviceManagement/managedDevices?$top=1&$select=id")
            .await
        {
            Ok(_) => Ok(ConnectorHealth::Healthy),
            Err(ConnectorError::AuthorizationDenied(_)) => Ok(ConnectorHealth::Degraded(
                "DeviceManagementManagedDevices.Read.All not granted".to_string(),
            )),
            Err(e) => Ok(ConnectorHealth::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl DeviceManagement for IntuneConnector {
    #[instrument(skip(self))]
    async fn find_by_serial(&self, serial_number: &str) -> ConnectorResult<Vec<ManagedDevice>> {
        let filter = Self::equals_filter("serialNumber", serial_number)?;
        let result = self.list(&filter).await;
        record_lookup("find_device_by_serial", &result);
        match &result {
            Ok(devices) => debug!(count = devices.len(), "Intune serial lookup"),
            Err(e) => warn!(error = %e, "Intune serial lookup failed"),
        }
        result
    }

    #[instrument(skip(self))]
    async fn devices_for_user(
        &self,
        user_principal_name: &str,
    ) -> ConnectorResult<Vec<ManagedDevice>> {
        let filter = Self::equals_filter("userPrincipalName", user_principal_name)?;
        let result = self.list(&filter).await;
        record_lookup("devices_for_user", &result);
        if let Err(e) = &result {
            warn!(error = %e, "Intune user device lookup failed");
        }
        result
    }

    #[instrument(skip(self))]
    async fn get_device(&self, device_id: &str) -> ConnectorResult<ManagedDevice> {
        let device_id = device_id.trim();
        if device_id.is_empty()
            || !device_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConnectorError::InvalidRequest(format!(
                "Invalid device id '{}'",
                device_id
            )));
        }
        let path = format!(
            "/deviceManagement/managedDevices/{}?$select={}",
            device_id, DEVICE_FIELDS
        );
        let result = self.client.get_json(&path).await;
        record_lookup("get_device", &result);
        result
    }
}
