//! Authentication and authorization for the API.
//!
//! Requests carry a Microsoft Entra ID access token as `Authorization:
//! Bearer`. The token signature is checked against the tenant's published
//! signing keys, then issuer, audience and expiry. The `roles` claim decides
//! whether the caller may change reference data.
//!
//! With `auth.enabled = false` every request runs as a local administrator.
//! That mode is meant for development against a local database only.

pub mod extractors;
mod jwt;

pub use extractors::{AuthenticatedUser, RequireAdmin};
pub use jwt::{Claims, JwtValidator};

use serde::{Deserialize, Serialize};

pub const DEFAULT_ADMIN_ROLE: &str = "Admin";

/// `auth` section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    pub tenant_id: String,
    /// Application (client) id of the API registration. Tokens must carry it,
    /// or `api://<client_id>`, as audience.
    pub client_id: String,
    /// Extra accepted audiences.
    pub audiences: Vec<String>,
    pub authority_host: String,
    /// App role that grants administrator rights.
    pub admin_role: String,
    /// How long fetched signing keys are reused.
    pub jwks_cache_secs: u64,
    /// Clock skew tolerated on `exp` and `nbf`.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tenant_id: String::new(),
            client_id: String::new(),
            audiences: Vec::new(),
            authority_host: dj_connectors::graph::DEFAULT_AUTHORITY_HOST.to_string(),
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
            jwks_cache_secs: 3600,
            leeway_secs: 60,
        }
    }
}

impl AuthConfig {
    /// Auth disabled, for local development and tests.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn jwks_url(&self) -> String {
        format!(
            "{}/{}/discovery/v2.0/keys",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id.trim()
        )
    }

    /// v2 and v1 token issuers for the tenant.
    pub fn issuers(&self) -> Vec<String> {
        let tenant = self.tenant_id.trim();
        vec![
            format!(
                "{}/{}/v2.0",
                self.authority_host.trim_end_matches('/'),
                tenant
            ),
            format!("https://sts.windows.net/{}/", tenant),
        ]
    }

    pub fn accepted_audiences(&self) -> Vec<String> {
        let client_id = self.client_id.trim();
        let mut audiences = vec![client_id.to_string(), format!("api://{}", client_id)];
        audiences.extend(self.audiences.iter().cloned());
        audiences
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn from_claims(roles: &[String], admin_role: &str) -> Self {
        if roles.iter().any(|r| r.eq_ignore_ascii_case(admin_role)) {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// The caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Entra object id.
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub role: Role,
}

impl Principal {
    /// Principal used for every request when auth is disabled.
    pub fn development() -> Self {
        Self {
            id: "00000000-0000-0000-0000-000000000000".to_string(),
            name: Some("Local Developer".to_string()),
            username: Some("dev@localhost".to_string()),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Name written to `performed_by` on asset events.
    pub fn actor(&self) -> &str {
        self.username
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}
