//! Retry logic.
//!
//! # Responsibilities
//! - Re-invoke a fallible async operation with exponential backoff
//! - Surface the last error once attempts are exhausted
//!
//! # Design Decisions
//! - Attempts are strictly sequential; never two in flight at once
//! - `RetryMode::Uniform` retries every failure, 4xx included
//! - `RetryMode::Transient` retries only timeouts, transport errors, 429, 5xx
//! - Cancellation and locally built failures (validation, invalid request)
//!   are never retried in either mode

use std::future::Future;
use std::time::Duration;

use crate::config::{RetryConfig, RetryMode};
use crate::error::{ApiError, ApiResult};
use crate::lifecycle::Scope;
use crate::observability::metrics;
use crate::resilience::backoff::{calculate_backoff, with_jitter};

/// Runtime retry policy, derived from [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
    pub mode: RetryMode,
    pub record_metrics: bool,
}

impl RetryPolicy {

    /// Delay to wait after failed `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms);
        if self.jitter {
            with_jitter(delay)
        } else {
            delay
        }
    }

    /// Whether `error` should be retried under this policy.
    pub fn is_retryable(&self, error: &ApiError) -> bool {
        match error {
            ApiError::Cancelled | ApiError::Validation(_) | ApiError::InvalidRequest(_) => false,
            _ => match self.mode {
                RetryMode::Uniform => true,
                RetryMode::Transient => error.is_transient(),
            },
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            jitter: config.jitter,
            mode: config.mode,
            record_metrics: true,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts` is reached. The backoff sleep is abandoned if
/// `scope` is cancelled.
pub async fn retry<F, Fut, T>(policy: &RetryPolicy, operation: &str, scope: Option<&Scope>, mut op: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if attempt >= max_attempts || !policy.is_retryable(&error) {
            if attempt > 1 {
                tracing::warn!(operation, attempt, error = %error, "Giving up after retries");
            }
            return Err(error);
        }

        let delay = policy.delay_for(attempt);
        tracing::warn!(
            operation,
            attempt,
            max_attempts,
            delay = ?delay,
            error = %error,
            "Request failed, retrying"
        );
        if policy.record_metrics {
            metrics::record_retry(operation);
        }

        match scope {
            Some(scope) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = scope.cancelled() => return Err(ApiError::Cancelled),
                }
            }
            None => tokio::time::sleep(delay).await,
        }
    }
}
