//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ConfigIssue};

/// Environment variable overriding `api.base_url`.
pub const BASE_URL_ENV: &str = "SHORTLY_API_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<ConfigIssue>),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ClientConfig = toml::from_str(&content)?;
    finish(config, std::env::var(BASE_URL_ENV).ok())
}

/// Load from `path` when given, otherwise start from defaults.
///
/// The base URL environment override is applied in both cases.
pub fn load_or_default(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => finish(ClientConfig::default(), std::env::var(BASE_URL_ENV).ok()),
    }
}

fn finish(mut config: ClientConfig, base_url_override: Option<String>) -> Result<ClientConfig, ConfigError> {
    if let Some(url) = base_url_override.filter(|u| !u.trim().is_empty()) {
        tracing::debug!(base_url = %url, "Base URL overridden from environment");
        config.api.base_url = url;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let config = finish(ClientConfig::default(), Some("https://staging.example/api".into())).unwrap();
        assert_eq!(config.api.base_url, "https://staging.example/api");
    }

    #[test]
    fn test_blank_override_ignored() {
        let config = finish(ClientConfig::default(), Some("  ".into())).unwrap();
        assert_eq!(config.api.base_url, ClientConfig::default().api.base_url);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("shortly-config-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[timeouts]\nrequest_ms = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("timeouts.request_ms"));

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/shortly.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
