//! Backend HTTP client.
//!
//! # Responsibilities
//! - Hold the shared connection pool and backend location
//! - Execute one attempt: build, send, read text, normalize
//! - Drive retries for a logical call
//! - Log and record every attempt
//!
//! # Design Decisions
//! - reqwest's own timeout is unused; the deadline wraps send and body read
//!   together so a stalled body also times out
//! - A fresh `x-request-id` is generated per attempt
//! - 401 is logged but never clears the session; that is the caller's call

use std::time::{Duration, Instant};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::request::{build_request, ApiRequest};
use crate::http::response::{normalize, Payload, RawResponse};
use crate::lifecycle::Scope;
use crate::observability::metrics;
use crate::resilience::{retry, with_deadline, RetryPolicy};

/// Shared client for the backend REST API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    user_agent: String,
    request_timeout: Duration,
    upload_timeout: Duration,
    retry_policy: RetryPolicy,
    metrics_enabled: bool,
}

impl ApiClient {
    /// Create a client from validated configuration.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.api.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid base URL '{}': {}", config.api.base_url, e)))?;

        let http = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        tracing::debug!(base_url = %base_url, "API client initialized");

        Ok(Self {
            http,
            base_url,
            user_agent: config.api.user_agent.clone(),
            request_timeout: Duration::from_millis(config.timeouts.request_ms),
            upload_timeout: Duration::from_millis(config.timeouts.upload_ms),
            retry_policy: RetryPolicy {
                record_metrics: config.observability.metrics_enabled,
                ..RetryPolicy::from(&config.retries)
            },
            metrics_enabled: config.observability.metrics_enabled,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Send one attempt and return status plus body text.
    pub async fn send(&self, request: &ApiRequest, scope: Option<&Scope>) -> ApiResult<RawResponse> {
        let request_id = Uuid::new_v4().to_string();
        let built = build_request(&self.http, &self.base_url, &self.user_agent, request, &request_id)?;
        let deadline = request.timeout.unwrap_or(self.request_timeout);
        let method = request.method.as_str();
        let path = request.endpoint.path();
        let start = Instant::now();

        tracing::debug!(request_id = %request_id, method, path = %path, "Sending request");

        let http = &self.http;
        let result = with_deadline(deadline, scope, async move {
            let response = http.execute(built).await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, ApiError>(RawResponse { status, body })
        })
        .await;

        let status_label = match &result {
            Ok(raw) => raw.status.to_string(),
            Err(ApiError::Timeout(_)) => "timeout".to_string(),
            Err(ApiError::Cancelled) => "cancelled".to_string(),
            Err(_) => "error".to_string(),
        };
        if self.metrics_enabled {
            metrics::record_request(method, request.endpoint.template(), &status_label, start);
        }

        match &result {
            Ok(raw) if raw.status == 401 => {
                tracing::warn!(request_id = %request_id, method, path = %path, "Backend rejected credentials");
            }
            Ok(raw) => {
                tracing::debug!(
                    request_id = %request_id,
                    status = raw.status,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Response received"
                );
            }
            Err(ApiError::Cancelled) => {
                tracing::debug!(request_id = %request_id, path = %path, "Request cancelled");
            }
            Err(e) => {
                tracing::warn!(request_id = %request_id, method, path = %path, error = %e, "Request failed");
            }
        }

        result
    }

    /// One attempt, normalized.
    pub async fn execute(&self, request: &ApiRequest, scope: Option<&Scope>) -> ApiResult<Payload> {
        let raw = self.send(request, scope).await?;
        normalize(&raw)
    }

    /// A full logical call under the client's retry policy.
    pub async fn call(&self, operation: &str, request: &ApiRequest, scope: Option<&Scope>) -> ApiResult<Payload> {
        retry(&self.retry_policy, operation, scope, || self.execute(request, scope)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reads_config() {
        let mut config = ClientConfig::default();
        config.timeouts.request_ms = 1_500;
        config.retries.max_attempts = 5;
        config.observability.metrics_enabled = false;
        let client = ApiClient::new(&config).unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api");
        assert_eq!(client.request_timeout(), Duration::from_millis(1_500));
        assert_eq!(client.upload_timeout(), Duration::from_secs(30));
        assert_eq!(client.retry_policy().max_attempts, 5);
        assert!(!client.retry_policy().record_metrics);
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let mut config = ClientConfig::default();
        config.api.base_url = "not a url".into();
        assert!(matches!(ApiClient::new(&config), Err(ApiError::InvalidRequest(_))));
    }
}
