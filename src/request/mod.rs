//! Request types for the fetch pipeline
//!
//! This module defines:
//! - The uniform [`HttpRequest`] capability every fetcher works with
//! - [`CrawlRequest`], the crate's own conforming request type
//! - Adapters that lift native URL-like values into the uniform capability

mod adapter;

pub use adapter::{adapt_request, FullUrl, IntoHttpRequest, UrlRequest};

use crate::{UrlError, UrlResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use url::Url;

/// The uniform request capability
///
/// Anything that can be fetched exposes an absolute URL. Headers are optional
/// and are forwarded to the transport untouched.
pub trait HttpRequest: fmt::Debug + Send + Sync {
    /// The absolute URL to fetch
    fn url(&self) -> &str;

    /// Extra headers to send with the request
    fn headers(&self) -> Option<&HeaderMap> {
        None
    }
}

/// A request to fetch a single absolute http(s) URL
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    url: Url,
    headers: HeaderMap,
}

impl CrawlRequest {
    /// Parses `url` into a request
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRequest)` - The URL is absolute and uses http or https
    /// * `Err(UrlError)` - The URL failed to parse or has another scheme
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_fetch::request::{CrawlRequest, HttpRequest};
    ///
    /// let request = CrawlRequest::new("https://example.com/page").unwrap();
    /// assert_eq!(request.url(), "https://example.com/page");
    /// ```
    pub fn new(url: &str) -> UrlResult<Self> {
        let parsed = Url::parse(url).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => UrlError::Relative(url.to_string()),
            other => UrlError::Parse(format!("{}: {}", url, other)),
        })?;
        Self::from_url(parsed)
    }

    /// Builds a request from an already parsed URL
    pub fn from_url(url: Url) -> UrlResult<Self> {
        match url.scheme() {
            "http" | "https" => Ok(Self {
                url,
                headers: HeaderMap::new(),
            }),
            other => Err(UrlError::InvalidScheme(other.to_string())),
        }
    }

    /// Adds a header, replacing any previous value with the same name
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The parsed URL
    pub fn parsed_url(&self) -> &Url {
        &self.url
    }
}

impl HttpRequest for CrawlRequest {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    fn headers(&self) -> Option<&HeaderMap> {
        if self.headers.is_empty() {
            None
        } else {
            Some(&self.headers)
        }
    }
}

impl fmt::Display for CrawlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::ACCEPT_LANGUAGE;

    #[test]
    fn test_crawl_request_accepts_http_and_https() {
        assert!(CrawlRequest::new("https://example.com/").is_ok());
        assert!(CrawlRequest::new("http://example.com/a?b=c").is_ok());
    }

    #[test]
    fn test_crawl_request_rejects_other_schemes() {
        let result = CrawlRequest::new("ftp://example.com/file");
        assert!(matches!(result, Err(UrlError::InvalidScheme(s)) if s == "ftp"));
    }

    #[test]
    fn test_crawl_request_rejects_relative() {
        let result = CrawlRequest::new("/just/a/path");
        assert!(matches!(result, Err(UrlError::Relative(_))));
    }

    #[test]
    fn test_headers_are_optional() {
        let request = CrawlRequest::new("https://example.com/").unwrap();
        assert!(request.headers().is_none());

        let request = request.with_header(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));
        let headers = request.headers().unwrap();
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "en");
    }
}
