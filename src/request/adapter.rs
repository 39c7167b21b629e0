//! Adapting request-like values to the uniform [`HttpRequest`] capability
//!
//! Values that already implement [`HttpRequest`] pass through untouched.
//! Values that only know their own full URL are wrapped in [`UrlRequest`].

use super::{CrawlRequest, HttpRequest};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A native request value that can report its full URL
pub trait FullUrl {
    /// Returns the complete URL this value points at
    fn full_url(&self) -> String;
}

impl FullUrl for Url {
    fn full_url(&self) -> String {
        self.as_str().to_string()
    }
}

impl FullUrl for String {
    fn full_url(&self) -> String {
        self.clone()
    }
}

impl FullUrl for &'static str {
    fn full_url(&self) -> String {
        (*self).to_string()
    }
}

/// Wraps a native value so it satisfies [`HttpRequest`]
///
/// The URL is taken once from [`FullUrl::full_url`] when the adapter is built;
/// the native value stays available through [`UrlRequest::inner`].
pub struct UrlRequest<T> {
    inner: T,
    url: String,
}

impl<T: FullUrl> UrlRequest<T> {
    pub fn new(inner: T) -> Self {
        let url = inner.full_url();
        Self { inner, url }
    }
}

impl<T> UrlRequest<T> {
    /// The wrapped native value
    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> fmt::Debug for UrlRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlRequest").field("url", &self.url).finish()
    }
}

impl<T: Send + Sync> HttpRequest for UrlRequest<T> {
    fn url(&self) -> &str {
        &self.url
    }
}

/// Conversion into a shared uniform request
///
/// Implemented for conforming request types (returned as-is) and for native
/// URL values (wrapped in [`UrlRequest`]).
pub trait IntoHttpRequest {
    fn into_http_request(self) -> Arc<dyn HttpRequest>;
}

impl IntoHttpRequest for Arc<dyn HttpRequest> {
    fn into_http_request(self) -> Arc<dyn HttpRequest> {
        self
    }
}

impl IntoHttpRequest for Box<dyn HttpRequest> {
    fn into_http_request(self) -> Arc<dyn HttpRequest> {
        Arc::from(self)
    }
}

impl IntoHttpRequest for CrawlRequest {
    fn into_http_request(self) -> Arc<dyn HttpRequest> {
        Arc::new(self)
    }
}

impl<T: Send + Sync + 'static> IntoHttpRequest for UrlRequest<T> {
    fn into_http_request(self) -> Arc<dyn HttpRequest> {
        Arc::new(self)
    }
}

impl IntoHttpRequest for Url {
    fn into_http_request(self) -> Arc<dyn HttpRequest> {
        Arc::new(UrlRequest::new(self))
    }
}

impl IntoHttpRequest for String {
    fn into_http_request(self) -> Arc<dyn HttpRequest> {
        Arc::new(UrlRequest::new(self))
    }
}

impl IntoHttpRequest for &'static str {
    fn into_http_request(self) -> Arc<dyn HttpRequest> {
        Arc::new(UrlRequest::new(self))
    }
}

/// Adapts any request-like value to the uniform capability
///
/// # Example
///
/// ```
/// use sumi_fetch::request::{adapt_request, HttpRequest};
///
/// let request = adapt_request("https://example.com/");
/// assert_eq!(request.url(), "https://example.com/");
/// ```
pub fn adapt_request<R: IntoHttpRequest>(request: R) -> Arc<dyn HttpRequest> {
    request.into_http_request()
}
