use crate::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for Sumi-Fetch
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    /// Headers added to every request that does not set them itself
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Fetcher behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: f64,

    /// Number of workers used by the pooled fetcher
    #[serde(rename = "pool-size", default = "default_pool_size")]
    pub pool_size: usize,

    /// Report 4xx/5xx answers as failures
    #[serde(rename = "error-for-status", default = "default_error_for_status")]
    pub error_for_status: bool,
}

impl FetcherConfig {
    /// The timeout as a [`Duration`]
    ///
    /// Negative, NaN and overflowing values are rejected rather than converted.
    pub fn timeout_duration(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.timeout).map_err(|e| {
            ConfigError::Validation(format!("invalid timeout {}: {}", self.timeout, e))
        })
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            pool_size: default_pool_size(),
            error_for_status: default_error_for_status(),
        }
    }
}

fn default_timeout() -> f64 {
    5.0
}

fn default_pool_size() -> usize {
    5
}

fn default_error_for_status() -> bool {
    true
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default)]
    pub contact_email: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`, with the
    /// parenthesised part reduced to whatever contact details are set.
    pub fn user_agent_string(&self) -> String {
        let base = format!("{}/{}", self.crawler_name, self.crawler_version);
        match (&self.contact_url, &self.contact_email) {
            (Some(url), Some(email)) => format!("{} (+{}; {})", base, url, email),
            (Some(url), None) => format!("{} (+{})", base, url),
            (None, Some(email)) => format!("{} ({})", base, email),
            (None, None) => base,
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
            contact_email: None,
        }
    }
}

fn default_crawler_name() -> String {
    "SumiFetch".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.fetcher.timeout, 5.0);
        assert_eq!(config.fetcher.pool_size, 5);
        assert!(config.fetcher.error_for_status);
        assert_eq!(
            config.fetcher.timeout_duration().unwrap(),
            Duration::from_secs(5)
        );
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_timeout_duration_rejects_unconvertible_values() {
        for timeout in [-1.0, f64::NAN, f64::INFINITY] {
            let config = FetcherConfig {
                timeout,
                ..FetcherConfig::default()
            };
            assert!(matches!(
                config.timeout_duration(),
                Err(ConfigError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_user_agent_format() {
        let mut config = UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: Some("https://example.com/about".to_string()),
            contact_email: Some("admin@example.com".to_string()),
        };
        assert_eq!(
            config.user_agent_string(),
            "TestCrawler/1.0 (+https://example.com/about; admin@example.com)"
        );

        config.contact_email = None;
        assert_eq!(
            config.user_agent_string(),
            "TestCrawler/1.0 (+https://example.com/about)"
        );

        config.contact_url = None;
        assert_eq!(config.user_agent_string(), "TestCrawler/1.0");
    }
}
