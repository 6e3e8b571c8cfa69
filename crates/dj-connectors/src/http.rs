//! HTTP plumbing shared by the Graph, Intune and Key Vault clients.
//!
//! Requests are rate limited, authenticated with a cached client-credentials
//! token and retried with exponential backoff on timeouts, connection errors,
//! 5xx responses and 429s.

use crate::secure_string::SecureString;
use crate::traits::{AuthConfig, ConnectorConfig, ConnectorError, ConnectorResult};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use moka::future::Cache as MokaCache;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, warn};

type RateLimiterType = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Longest wait honoured from a `Retry-After` header.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

pub struct HttpClient {
    client: Client,
    config: ConnectorConfig,
    oauth_token: Arc<RwLock<Option<OAuthToken>>>,
    rate_limiter: Option<Arc<RateLimiterType>>,
}

#[derive(Clone)]
struct OAuthToken {
    access_token: SecureString,
    expires_at: Instant,
}

impl OAuthToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub period: Duration,
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    /// Stays well below Graph's per-app throttling limits.
    fn default() -> Self {
        Self {
            max_requests: 600,
            period: Duration::from_secs(60),
            burst_size: 20,
        }
    }
}

impl HttpClient {
    pub fn new(config: ConnectorConfig) -> ConnectorResult<Self> {
        Self::with_rate_limit(config, None)
    }

    pub fn with_rate_limit(
        config: ConnectorConfig,
        rate_limit: Option<RateLimitConfig>,
    ) -> ConnectorResult<Self> {
        // TLS verification can only be switched off in debug builds.
        let verify_tls = config.verify_tls || !cfg!(debug_assertions);
        if !verify_tls {
            warn!(
                connector = %config.name,
                base_url = %config.base_url,
                "TLS certificate verification disabled"
            );
        }

        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            if let (Ok(name), Ok(val)) = (
                HeaderName::try_from(key.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(name, val);
            }
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!verify_tls)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .default_headers(headers)
            .build()
            .map_err(|e| ConnectorError::ConfigError(e.to_string()))?;

        let rate_limiter = match rate_limit {
            Some(rl) => Some(Arc::new(build_rate_limiter(&rl)?)),
            None => None,
        };

        Ok(Self {
            client,
            config,
            oauth_token: Arc::new(RwLock::new(None)),
            rate_limiter,
        })
    }

    /// Joins `path` onto the base URL. Absolute URLs, such as Graph's
    /// `@odata.nextLink`, are returned unchanged.
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            return path.to_string();
        }
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub async fn get(&self, path: &str) -> ConnectorResult<Response> {
        self.get_with_headers(path, &[]).await
    }

    /// GET with extra request headers, e.g. `ConsistencyLevel: eventual` for
    /// Graph advanced queries.
    pub async fn get_with_headers(
        &self,
        path: &str,
        headers: &[(&'static str, &str)],
    ) -> ConnectorResult<Response> {
        let mut request = self.client.get(self.build_url(path));
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.execute_with_retry(request).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConnectorResult<T> {
        let response = self.get(path).await?;
        parse_json_response(response).await
    }

    pub async fn get_json_with_headers<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&'static str, &str)],
    ) -> ConnectorResult<T> {
        let response = self.get_with_headers(path, headers).await?;
        parse_json_response(response).await
    }

    async fn execute_with_retry(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ConnectorResult<Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
        let request = self.add_auth(request).await?;

        let mut last_error = None;
        let mut delay = Duration::from_millis(200);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!(connector = %self.config.name, attempt, ?delay, "Retrying request");
                sleep(delay).await;
                delay = std::cmp::min(delay * 2 + jitter(), Duration::from_secs(10));
            }

            let request = request
                .try_clone()
                .ok_or_else(|| ConnectorError::Internal("Request body is not cloneable".into()))?;

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    last_error = Some(transport_error(e));
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after_secs(&response);
                if attempt < self.config.max_retries {
                    warn!(connector = %self.config.name, retry_after, "Rate limited, backing off");
                    sleep(Duration::from_secs(retry_after.min(MAX_RETRY_AFTER_SECS))).await;
                    last_error = Some(ConnectorError::RateLimited(retry_after));
                    continue;
                }
                return Err(ConnectorError::RateLimited(retry_after));
            }

            if status.is_server_error() {
                warn!(connector = %self.config.name, %status, "Upstream server error");
                last_error = Some(ConnectorError::RequestFailed(format!(
                    "Server error: {}",
                    status
                )));
                continue;
            }

            if status.is_client_error() {
                return Err(client_error(response).await);
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or_else(|| ConnectorError::Internal("Unknown error".to_string())))
    }

    async fn add_auth(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ConnectorResult<reqwest::RequestBuilder> {
        match &self.config.auth {
            AuthConfig::None => Ok(request),
            AuthConfig::BearerToken { token } => Ok(request.bearer_auth(token.expose_secret())),
            AuthConfig::OAuth2 {
                client_id,
                client_secret,
                token_url,
                scopes,
            } => {
                let token = self
                    .oauth_token(client_id, client_secret, token_url, scopes)
                    .await?;
                Ok(request.bearer_auth(token.expose_secret()))
            }
        }
    }

    /// Returns the cached token, fetching a new one when it is missing or
    /// about to expire.
    async fn oauth_token(
        &self,
        client_id: &str,
        client_secret: &SecureString,
        token_url: &str,
        scopes: &[String],
    ) -> ConnectorResult<SecureString> {
        if let Some(token) = self.oauth_token.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let mut cached = self.oauth_token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        info!(connector = %self.config.name, "Requesting OAuth2 access token");
        let scope = scopes.join(" ");
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret.expose_secret()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .client
            .post(token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ConnectorError::AuthenticationFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ConnectorError::AuthenticationFailed(format!(
                "Token request failed: {}",
                response.status()
            )));
        }

        #[derive(serde::Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: u64,
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ConnectorError::InvalidResponse(e.to_string()))?;

        let token = OAuthToken {
            access_token: SecureString::new(body.access_token),
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        };
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}

fn build_rate_limiter(config: &RateLimitConfig) -> ConnectorResult<RateLimiterType> {
    let per_request = config.period / config.max_requests.max(1);
    let quota = Quota::with_period(per_request)
        .ok_or_else(|| ConnectorError::ConfigError("Rate limit period must be non-zero".into()))?
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));
    Ok(GovernorRateLimiter::direct(quota))
}

async fn parse_json_response<T: DeserializeOwned>(response: Response) -> ConnectorResult<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ConnectorError::InvalidResponse(e.to_string()))?;

    serde_json::from_str(&text).map_err(|e| {
        ConnectorError::InvalidResponse(format!(
            "Failed to parse response (status {}): {} - Body: {}",
            status,
            e,
            text.chars().take(300).collect::<String>()
        ))
    })
}

fn transport_error(e: reqwest::Error) -> ConnectorError {
    if e.is_timeout() {
        ConnectorError::Timeout(e.to_string())
    } else if e.is_connect() {
        ConnectorError::ConnectionFailed(e.to_string())
    } else {
        ConnectorError::RequestFailed(e.to_string())
    }
}

async fn client_error(response: Response) -> ConnectorError {
    match response.status() {
        StatusCode::UNAUTHORIZED => ConnectorError::AuthenticationFailed("Unauthorized".into()),
        StatusCode::FORBIDDEN => ConnectorError::AuthorizationDenied("Forbidden".into()),
        StatusCode::NOT_FOUND => ConnectorError::NotFound("Resource not found".into()),
        StatusCode::BAD_REQUEST => {
            let body = response.text().await.unwrap_or_default();
            ConnectorError::InvalidRequest(format!(
                "Bad request: {}",
                body.chars().take(300).collect::<String>()
            ))
        }
        status => ConnectorError::RequestFailed(format!("Client error: {}", status)),
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(5)
}

fn jitter() -> Duration {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    Instant::now().hash(&mut hasher);
    Duration::from_millis(hasher.finish() % 100)
}

/// TTL cache for lookup results.
pub struct ResponseCache<V: Clone + Send + Sync + 'static> {
    cache: MokaCache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> ResponseCache<V> {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: String, value: V) {
        self.cache.insert(key, value).await;
    }

    /// Returns the cached value or computes and stores it. Errors are not cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: String, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(v) = self.cache.get(&key).await {
            return Ok(v);
        }
        let value = f().await?;
        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }
}
