//! reqwest-backed transport
//!
//! This module handles the actual HTTP requests:
//! - Building the HTTP client with a proper user agent string
//! - GET requests with per-request timeout and headers
//! - Reading the response body
//! - Error classification

use super::{RawResponse, Transport};
use crate::config::{Config, UserAgentConfig};
use crate::request::HttpRequest;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// Timeouts are applied per request, so none is set on the client itself.
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_fetch::config::UserAgentConfig;
/// use sumi_fetch::transport::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiFetch".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: Some("https://example.com/about".to_string()),
///     contact_email: Some("admin@example.com".to_string()),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent_string())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Transport that performs requests with a shared [`reqwest::Client`]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    error_for_status: bool,
}

impl ReqwestTransport {
    /// Wraps an existing client
    ///
    /// With `error_for_status` set, 4xx and 5xx answers are reported as
    /// [`FetchError::Status`] instead of a response.
    pub fn new(client: Client, error_for_status: bool) -> Self {
        Self {
            client,
            error_for_status,
        }
    }

    /// Builds the client described by `config`
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent)?;
        Ok(Self::new(client, config.fetcher.error_for_status))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn open(
        &self,
        request: &dyn HttpRequest,
        timeout: Duration,
    ) -> Result<RawResponse, FetchError> {
        let url = request.url();

        let mut builder = self.client.get(url).timeout(timeout);
        if let Some(headers) = request.headers() {
            builder = builder.headers(headers.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_error(url, timeout, e))?;

        let status = response.status();
        if self.error_for_status && (status.is_client_error() || status.is_server_error()) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let headers = response.headers().clone();

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, timeout, e))?;

        Ok(RawResponse {
            url: final_url,
            status: status.as_u16(),
            headers,
            body: body.to_vec(),
        })
    }
}

/// Maps a reqwest error onto [`FetchError`]
fn classify_error(url: &str, timeout: Duration, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
