//! Transport layer
//!
//! The fetchers never talk to the network directly. They call a [`Transport`],
//! which performs one GET and reads the whole body. [`ReqwestTransport`] is the
//! production implementation.

mod http;

pub use http::{build_http_client, ReqwestTransport};

use crate::request::HttpRequest;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::time::Duration;

/// A response as handed back by a transport, body already read
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status: u16,

    pub headers: HeaderMap,

    /// Entire response body
    pub body: Vec<u8>,
}

/// Performs a single network fetch
///
/// Implementations must be safe to call concurrently from several workers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens `request` and reads the full response
    ///
    /// # Arguments
    ///
    /// * `request` - The request to fetch
    /// * `timeout` - Upper bound for the whole exchange
    async fn open(
        &self,
        request: &dyn HttpRequest,
        timeout: Duration,
    ) -> Result<RawResponse, FetchError>;
}
