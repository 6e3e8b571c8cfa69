//! Graph `/users` lookups for the owner picker.

use super::{record_lookup, GraphConfig, GraphList};
use crate::http::{HttpClient, RateLimitConfig, ResponseCache};
use crate::traits::{
    Connector, ConnectorError, ConnectorHealth, ConnectorResult, DirectoryUser, UserDirectory,
};
use async_trait::async_trait;
use dj_core::validation::ODataSanitizer;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const USER_FIELDS: &str =
    "id,displayName,userPrincipalName,mail,jobTitle,department,officeLocation,accountEnabled";

/// Queries shorter than this return nothing instead of hitting Graph.
pub const MIN_SEARCH_LENGTH: usize = 2;
pub const MAX_SEARCH_RESULTS: usize = 50;

pub struct GraphUserConnector {
    client: HttpClient,
    users: ResponseCache<DirectoryUser>,
}

impl GraphUserConnector {
    pub fn new(config: &GraphConfig) -> ConnectorResult<Self> {
        let client = HttpClient::with_rate_limit(
            config.connector_config("graph-users")?,
            Some(RateLimitConfig::default()),
        )?;
        Ok(Self {
            client,
            users: ResponseCache::new(Duration::from_secs(300), 1_000),
        })
    }

    /// `$filter` for a prefix search over display name, mail and UPN.
    pub fn search_filter(query: &str) -> ConnectorResult<String> {
        let quoted = ODataSanitizer::quote("query", query)?;
        Ok(format!(
            "startswith(displayName,{q}) or startswith(mail,{q}) or startswith(userPrincipalName,{q})",
            q = quoted
        ))
    }

    async fn fetch_user(&self, id_or_upn: &str) -> ConnectorResult<DirectoryUser> {
        let path = format!(
            "/users/{}?$select={}",
            urlencoding::encode(id_or_upn),
            USER_FIELDS
        );
        self.client.get_json(&path).await
    }
}

#[async_trait]
impl Connector for GraphUserConnector {
    fn name(&self) -> &str {
        self.client.name()
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        match self.client.get("/organization?$select=id").await {
            Ok(_) => Ok(ConnectorHealth::Healthy),
            Err(ConnectorError::AuthenticationFailed(e)) => Ok(ConnectorHealth::Unhealthy(
                format!("Authentication failed: {}", e),
            )),
            Err(e) => Ok(ConnectorHealth::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl UserDirectory for GraphUserConnector {
    #[instrument(skip(self))]
    async fn search_users(&self, query: &str, limit: usize) -> ConnectorResult<Vec<DirectoryUser>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LENGTH {
            return Ok(Vec::new());
        }
        let filter = Self::search_filter(query)?;
        let path = format!(
            "/users?$filter={}&$select={}&$top={}",
            urlencoding::encode(&filter),
            USER_FIELDS,
            limit.clamp(1, MAX_SEARCH_RESULTS)
        );

        let result = self
            .client
            .get_json::<GraphList<DirectoryUser>>(&path)
            .await
            .map(|list| list.value);
        record_lookup("search_users", &result);
        match &result {
            Ok(users) => debug!(count = users.len(), "Graph user search"),
            Err(e) => warn!(error = %e, "Graph user search failed"),
        }
        result
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id_or_upn: &str) -> ConnectorResult<DirectoryUser> {
        let key = id_or_upn.trim().to_lowercase();
        if key.is_empty() || key.contains('/') {
            return Err(ConnectorError::InvalidRequest(format!(
                "Invalid user identifier '{}'",
                id_or_upn
            )));
        }

        let result = self
            .users
            .get_or_try_insert_with(key.clone(), || self.fetch_user(&key))
            .await
            .map_err(|e| match e {
                ConnectorError::NotFound(_) => {
                    ConnectorError::NotFound(format!("User '{}' not found", id_or_upn))
                }
                other => other,
            });
        record_lookup("get_user", &result);
        if let Err(e) = &result {
            warn!(error = %e, "Graph user lookup failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_filter_escapes_quotes() {
        let filter = GraphUserConnector::search_filter("O'Brien").unwrap();
        assert_eq!(
            filter,
            "startswith(displayName,'O''Brien') or startswith(mail,'O''Brien') or startswith(userPrincipalName,'O''Brien')"
        );
    }

    #[test]
    fn test_search_filter_rejects_injection() {
        for query in ["x' or 1 eq 1", "jan$top=999", "a') or startswith(mail,'"] {
            assert!(matches!(
                GraphUserConnector::search_filter(query),
                Err(ConnectorError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn test_new_requires_configuration() {
        assert!(matches!(
            GraphUserConnector::new(&GraphConfig::default()),
            Err(ConnectorError::NotConfigured(_))
        ));
    }
}
