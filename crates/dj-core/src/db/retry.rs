//! Retry helper for transient database failures.
//!
//! Wraps pool creation at start-up (see [`super::create_pool_with_retry`]) so
//! the server and CLI wait for a database that is still coming up. Constraint
//! violations are never retried here; the asset-code allocator has its own
//! loop for those.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::DbError;

/// Backoff settings for [`with_retry`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Fail on the first error.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Settings for waiting on a database that is still starting up.
    pub fn startup() -> Self {
        Self {
            max_retries: 10,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 1.5,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(base.min(self.max_delay.as_millis() as f64) as u64)
    }
}

/// Returns true when retrying the failed operation has a chance of succeeding.
pub fn is_transient_error(error: &DbError) -> bool {
    match error {
        DbError::PoolExhausted => true,
        DbError::Connection(msg) => {
            let msg = msg.to_lowercase();
            msg.contains("timeout")
                || msg.contains("refused")
                || msg.contains("reset")
                || msg.contains("broken pipe")
                || msg.contains("temporarily unavailable")
        }
        DbError::Query(msg) => {
            let msg = msg.to_lowercase();
            msg.contains("deadlock")
                || msg.contains("database is locked")
                || msg.contains("busy")
                || msg.contains("timeout")
        }
        DbError::NotFound { .. }
        | DbError::Constraint(_)
        | DbError::InUse(_)
        | DbError::Serialization(_)
        | DbError::Migration(_)
        | DbError::Configuration(_) => false,
    }
}

/// Runs `f` until it succeeds, fails permanently, or runs out of attempts.
pub async fn with_retry<F, Fut, T>(
    config: RetryConfig,
    operation_name: &str,
    f: F,
) -> Result<T, DbError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(
                        operation = %operation_name,
                        attempt = attempt + 1,
                        "Succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(e) if is_transient_error(&e) && attempt < config.max_retries => {
                let delay = config.delay_for(attempt);
                warn!(
                    operation = %operation_name,
                    attempt = attempt + 1,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient database error, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
