//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts >= 1)
//! - Check the base URL is an absolute http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ConfigIssue>>

use std::fmt;
use url::Url;

use crate::config::schema::ClientConfig;

/// One year.
const MAX_EXPIRY_HOURS: u64 = 24 * 365;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for values serde cannot reject.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();
    let mut issue = |field: &'static str, message: String| issues.push(ConfigIssue { field, message });

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => issue("api.base_url", format!("unsupported scheme '{}'", url.scheme())),
        Err(e) => issue("api.base_url", format!("invalid URL '{}': {}", config.api.base_url, e)),
    }

    if config.timeouts.request_ms == 0 {
        issue("timeouts.request_ms", "must be greater than zero".into());
    }
    if config.timeouts.upload_ms == 0 {
        issue("timeouts.upload_ms", "must be greater than zero".into());
    }

    if config.retries.max_attempts == 0 {
        issue("retries.max_attempts", "must be at least 1".into());
    }
    if config.retries.max_delay_ms < config.retries.base_delay_ms {
        issue("retries.max_delay_ms", "must not be smaller than base_delay_ms".into());
    }

    if config.session.expiry_hours == 0 {
        issue("session.expiry_hours", "must be greater than zero".into());
    } else if config.session.expiry_hours > MAX_EXPIRY_HOURS {
        issue("session.expiry_hours", format!("must be at most {MAX_EXPIRY_HOURS}"));
    }
    if config.session.storage_path.trim().is_empty() {
        issue("session.storage_path", "must not be empty".into());
    }

    if config.uploads.video_formats.is_empty() {
        issue("uploads.video_formats", "at least one format is required".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
