//! Bearer token validation against Entra ID signing keys.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{AuthConfig, Principal, Role};
use crate::error::ApiError;

const JWKS_CACHE_KEY: &str = "jwks";

/// Minimum time between key-set refetches forced by an unknown `kid`.
const MIN_FORCED_REFRESH: Duration = Duration::from_secs(300);

/// Claims read from Entra ID access tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// A string in Entra tokens; checked by the validator, not here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
    /// Object id of the user in the tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// v1 tokens carry the UPN here instead of `preferred_username`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upn: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    fn into_principal(self, admin_role: &str) -> Principal {
        Principal {
            role: Role::from_claims(&self.roles, admin_role),
            id: self.oid.unwrap_or(self.sub),
            name: self.name,
            username: self.preferred_username.or(self.upn),
        }
    }
}

enum KeySource {
    /// RS256 keys published by the tenant, cached.
    Jwks {
        url: String,
        http: reqwest::Client,
        cache: Cache<&'static str, Arc<JwkSet>>,
        refresh: RefreshGate,
    },
    /// HS256 shared secret, for tests and local tooling.
    Shared(DecodingKey),
}

/// Allows at most one forced refresh per `min_interval`.
struct RefreshGate {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RefreshGate {
    fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    fn try_acquire(&self, now: Instant) -> bool {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        match *last {
            Some(prev) if now.saturating_duration_since(prev) < self.min_interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

pub struct JwtValidator {
    config: AuthConfig,
    keys: KeySource,
}

impl JwtValidator {
    pub fn new(config: AuthConfig) -> Result<Self, ApiError> {
        if config.tenant_id.trim().is_empty() || config.client_id.trim().is_empty() {
            return Err(ApiError::Internal(
                "auth.tenant_id and auth.client_id are required when auth is enabled".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(config.jwks_cache_secs.max(60)))
            .build();
        info!(tenant = %config.tenant_id, "Entra ID token validation enabled");
        Ok(Self {
            keys: KeySource::Jwks {
                url: config.jwks_url(),
                http,
                cache,
                refresh: RefreshGate::new(MIN_FORCED_REFRESH),
            },
            config,
        })
    }

    pub fn with_shared_secret(config: AuthConfig, secret: &[u8]) -> Self {
        Self {
            config,
            keys: KeySource::Shared(DecodingKey::from_secret(secret)),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verifies `token` and returns its caller.
    pub async fn validate(&self, token: &str) -> Result<Principal, ApiError> {
        let header = decode_header(token)
            .map_err(|_| ApiError::Unauthorized("Malformed bearer token".to_string()))?;

        let (key, algorithm) = match &self.keys {
            KeySource::Shared(key) => (key.clone(), Algorithm::HS256),
            KeySource::Jwks { .. } => {
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| ApiError::Unauthorized("Token has no key id".to_string()))?;
                (self.signing_key(kid).await?, Algorithm::RS256)
            }
        };
        if header.alg != algorithm {
            return Err(ApiError::Unauthorized(
                "Unexpected token algorithm".to_string(),
            ));
        }

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(self.config.issuers().as_slice());
        validation.set_audience(self.config.accepted_audiences().as_slice());
        validation.leeway = self.config.leeway_secs;

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                ErrorKind::InvalidAudience => "Token audience not accepted",
                ErrorKind::InvalidIssuer => "Token issuer not accepted",
                ErrorKind::ImmatureSignature => "Token not yet valid",
                _ => "Invalid token",
            };
            debug!(error = %e, reason, "Bearer token rejected");
            ApiError::Unauthorized(reason.to_string())
        })?;

        Ok(data.claims.into_principal(&self.config.admin_role))
    }

    /// Finds the key for `kid`. When the cached set does not contain it (keys
    /// roll over) the set is refetched, at most once per [`MIN_FORCED_REFRESH`],
    /// so tokens with made-up key ids cannot drive requests to the tenant.
    async fn signing_key(&self, kid: &str) -> Result<DecodingKey, ApiError> {
        let KeySource::Jwks {
            url,
            http,
            cache,
            refresh,
        } = &self.keys
        else {
            return Err(ApiError::Internal("No key set configured".to_string()));
        };

        let set = cached_jwks(cache, http, url).await?;
        if let Some(key) = decoding_key(&set, kid)? {
            return Ok(key);
        }

        if refresh.try_acquire(Instant::now()) {
            debug!(kid, "Signing key not cached, refreshing key set");
            cache.invalidate(JWKS_CACHE_KEY).await;
            let set = cached_jwks(cache, http, url).await?;
            if let Some(key) = decoding_key(&set, kid)? {
                return Ok(key);
            }
        } else {
            debug!(kid, "Signing key not cached, key set refreshed recently");
        }

        warn!(kid, "Token signed with unknown key");
        Err(ApiError::Unauthorized("Unknown signing key".to_string()))
    }
}

async fn cached_jwks(
    cache: &Cache<&'static str, Arc<JwkSet>>,
    http: &reqwest::Client,
    url: &str,
) -> Result<Arc<JwkSet>, ApiError> {
    cache
        .try_get_with(JWKS_CACHE_KEY, fetch_jwks(http, url))
        .await
        .map_err(|e| ApiError::BadGateway(e.to_string()))
}

fn decoding_key(set: &JwkSet, kid: &str) -> Result<Option<DecodingKey>, ApiError> {
    set.find(kid)
        .map(|jwk| {
            DecodingKey::from_jwk(jwk)
                .map_err(|e| ApiError::Unauthorized(format!("Unusable signing key: {}", e)))
        })
        .transpose()
}

async fn fetch_jwks(http: &reqwest::Client, url: &str) -> Result<Arc<JwkSet>, String> {
    let response = http
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| format!("Failed to fetch signing keys: {}", e))?;
    let set: JwkSet = response
        .json()
        .await
        .map_err(|e| format!("Invalid signing key set: {}", e))?;
    debug!(keys = set.keys.len(), "Fetched signing keys");
    Ok(Arc::new(set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-signing-secret";

    fn config() -> AuthConfig {
        AuthConfig {
            tenant_id: "tenant-1".into(),
            client_id: "app-1".into(),
            ..Default::default()
        }
    }

    fn claims() -> Claims {
        Claims {
            sub: "subject".into(),
            exp: (chrono::Utc::now().timestamp() + 600) as u64,
            iss: Some("https://login.microsoftonline.com/tenant-1/v2.0".into()),
            aud: Some("api://app-1".into()),
            oid: Some("oid-1".into()),
            name: Some("Jan Peeters".into()),
            preferred_username: Some("jan.peeters@diepenbeek.be".into()),
            upn: None,
            roles: vec!["Admin".into()],
        }
    }

    fn token(claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_yields_principal() {
        let validator = JwtValidator::with_shared_secret(config(), SECRET);
        let principal = validator.validate(&token(&claims())).await.unwrap();
        assert_eq!(principal.id, "oid-1");
        assert_eq!(principal.actor(), "jan.peeters@diepenbeek.be");
        assert!(principal.is_admin());
    }

    #[tokio::test]
    async fn test_user_without_admin_role() {
        let validator = JwtValidator::with_shared_secret(config(), SECRET);
        let mut c = claims();
        c.roles = vec!["Reader".into()];
        c.iss = Some("https://sts.windows.net/tenant-1/".into());
        c.aud = Some("app-1".into());
        let principal = validator.validate(&token(&c)).await.unwrap();
        assert_eq!(principal.role, Role::User);
    }

    #[tokio::test]
    async fn test_rejects_wrong_audience_issuer_and_expiry() {
        let validator = JwtValidator::with_shared_secret(config(), SECRET);

        let mut wrong_aud = claims();
        wrong_aud.aud = Some("api://other".into());
        assert!(matches!(
            validator.validate(&token(&wrong_aud)).await,
            Err(ApiError::Unauthorized(_))
        ));

        let mut wrong_iss = claims();
        wrong_iss.iss = Some("https://login.microsoftonline.com/other/v2.0".into());
        assert!(validator.validate(&token(&wrong_iss)).await.is_err());

        let mut expired = claims();
        expired.exp = (chrono::Utc::now().timestamp() - 3600) as u64;
        match validator.validate(&token(&expired)).await {
            Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejects_garbage_and_wrong_secret() {
        let validator = JwtValidator::with_shared_secret(config(), b"another-secret");
        assert!(validator.validate("not-a-jwt").await.is_err());
        assert!(validator.validate(&token(&claims())).await.is_err());
    }

    #[test]
    fn test_refresh_gate_limits_forced_refreshes() {
        let gate = RefreshGate::new(Duration::from_secs(300));
        let start = Instant::now();
        assert!(gate.try_acquire(start));
        assert!(!gate.try_acquire(start + Duration::from_secs(10)));
        assert!(!gate.try_acquire(start + Duration::from_secs(299)));
        assert!(gate.try_acquire(start + Duration::from_secs(301)));
        assert!(!gate.try_acquire(start + Duration::from_secs(302)));
    }

    /// `{"alg":"RS256","typ":"JWT","kid":"rotated-key"}` with an empty payload.
    const UNKNOWN_KID_TOKEN: &str =
        "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCIsImtpZCI6InJvdGF0ZWQta2V5In0.e30.c2ln";

    #[tokio::test]
    async fn test_unknown_kid_does_not_refetch_every_request() {
        use axum::{routing::get, Json, Router};
        use std::sync::atomic::{AtomicUsize, Ordering};

        let fetches = Arc::new(AtomicUsize::new(0));
        let counter = fetches.clone();
        let app = Router::new().route(
            "/tenant-1/discovery/v2.0/keys",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(serde_json::json!({ "keys": [] }))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let validator = JwtValidator::new(AuthConfig {
            authority_host: format!("http://{}", addr),
            ..config()
        })
        .unwrap();

        for _ in 0..5 {
            match validator.validate(UNKNOWN_KID_TOKEN).await {
                Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, "Unknown signing key"),
                other => panic!("unexpected {:?}", other.map(|p| p.id)),
            }
        }
        // Initial fill plus one forced refresh.
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_new_requires_tenant_and_client() {
        assert!(JwtValidator::new(AuthConfig::default()).is_err());
        assert!(JwtValidator::new(config()).is_ok());
    }
}
