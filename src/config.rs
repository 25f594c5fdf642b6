//! Centralized configuration management for drugview

use anyhow::{Context, Result};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the drug catalog API
    pub api_url: String,
    /// Number of records scanned when deriving the distinct company list.
    /// Companies that only appear beyond this window are missed.
    pub company_scan_limit: usize,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "drugview/0.1.0".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("DRUGVIEW_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let company_scan_limit =
            parse_env_var("DRUGVIEW_COMPANY_SCAN_LIMIT")?.unwrap_or(10_000);

        let http = HttpConfig {
            timeout_seconds: parse_env_var("DRUGVIEW_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: std::env::var("DRUGVIEW_USER_AGENT")
                .unwrap_or_else(|_| "drugview/0.1.0".to_string()),
        };

        Ok(Config {
            api_url,
            company_scan_limit,
            http,
        })
    }

    /// Replace the API base URL when an override is given (e.g. from the CLI)
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "API base URL must start with http:// or https://: {}",
                self.api_url
            ));
        }

        if self.company_scan_limit == 0 {
            return Err(anyhow::anyhow!("Company scan limit must be at least 1"));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.company_scan_limit, 10_000);
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.http.user_agent, "drugview/0.1.0");
    }

    #[test]
    fn test_config_validation() {
        let config = Config::from_env().unwrap();
        // Should not fail for default values
        config.validate().unwrap();
    }

    #[test]
    fn test_config_rejects_bad_url() {
        let config = Config::from_env()
            .unwrap()
            .with_api_url(Some("ftp://nope".to_string()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_url_override() {
        let config = Config::from_env()
            .unwrap()
            .with_api_url(Some("https://drugs.example.com".to_string()));
        assert_eq!(config.api_url, "https://drugs.example.com");

        let config = Config::from_env().unwrap().with_api_url(None);
        assert_eq!(config.api_url, "http://localhost:3000");
    }
}
