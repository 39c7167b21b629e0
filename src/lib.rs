//! Sumi-Fetch: uniform HTTP fetching for crawlers
//!
//! This crate adapts a plain HTTP client to the request/response model used by
//! a crawling framework. Requests go through a middleware chain, are fetched
//! either one at a time or on a fixed-size worker pool, and come back as an
//! ordered list of [`FetchResult`] values where failures are data, not errors.

pub mod config;
pub mod fetcher;
pub mod middleware;
pub mod output;
pub mod request;
pub mod response;
pub mod transport;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Sumi-Fetch setup and batch operations
#[derive(Debug, Error)]
pub enum SumiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker pool size must be between 1 and {max}, got {0}", max = crate::config::MAX_POOL_SIZE)]
    InvalidPoolSize(usize),

    #[error("Pooled fetcher must be created inside a Tokio runtime")]
    NoRuntime,
}

/// Error describing why a single request could not be fetched
///
/// These never escape a batch. They are carried inside
/// [`response::FetchFailure`] next to the request that caused them.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url} after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Middleware '{middleware}' rejected {url}: {message}")]
    Middleware {
        middleware: String,
        url: String,
        message: String,
    },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Worker lost while fetching {url}")]
    WorkerLost { url: String },
}

/// Coarse classification of a fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// The request did not complete within the configured timeout
    Timeout,

    /// The host could not be reached (connection refused, DNS failure, TLS error)
    Unreachable,

    /// The server answered with an error status code
    HttpStatus,

    /// The request itself was malformed
    InvalidRequest,

    /// A middleware refused the request or response
    Middleware,

    /// Anything else
    Failed,
}

impl FetchError {
    /// Returns the URL of the request this error belongs to
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. }
            | Self::Http { url, .. }
            | Self::Status { url, .. }
            | Self::InvalidUrl { url, .. }
            | Self::Middleware { url, .. }
            | Self::Transport { url, .. }
            | Self::WorkerLost { url } => url,
        }
    }

    /// Classifies the error
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Http { source, .. } if source.is_timeout() => FailureKind::Timeout,
            Self::Http { source, .. } if source.is_connect() => FailureKind::Unreachable,
            Self::Http { source, .. } if source.is_builder() => FailureKind::InvalidRequest,
            Self::Http { .. } => FailureKind::Failed,
            Self::Status { .. } => FailureKind::HttpStatus,
            Self::InvalidUrl { .. } => FailureKind::InvalidRequest,
            Self::Middleware { .. } => FailureKind::Middleware,
            Self::Transport { .. } | Self::WorkerLost { .. } => FailureKind::Failed,
        }
    }

    /// Returns true if the request ran out of time
    pub fn is_timeout(&self) -> bool {
        self.kind() == FailureKind::Timeout
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid header in config: {0}")]
    InvalidHeader(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL is not absolute: {0}")]
    Relative(String),
}

/// Result type alias for Sumi-Fetch operations
pub type Result<T> = std::result::Result<T, SumiError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use fetcher::{FetcherOptions, PooledFetcher, SequentialFetcher, WorkerPool};
pub use middleware::{AdapterMiddleware, Middleware, MiddlewareChain};
pub use request::{adapt_request, CrawlRequest, FullUrl, HttpRequest, IntoHttpRequest, UrlRequest};
pub use response::{adapt_response, FetchFailure, FetchResult, HttpResponse};
pub use transport::{RawResponse, ReqwestTransport, Transport};
