//! Fetch results
//!
//! A fetch either produces an [`HttpResponse`] with the whole body in memory,
//! or a [`FetchFailure`] naming the request and the error. Both are wrapped in
//! [`FetchResult`] so a batch can report every outcome in input order.

use crate::request::HttpRequest;
use crate::transport::RawResponse;
use crate::FetchError;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::sync::Arc;

/// A successfully fetched resource
#[derive(Debug)]
pub struct HttpResponse {
    request: Arc<dyn HttpRequest>,
    final_url: String,
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
    fetched_at: DateTime<Utc>,
}

impl HttpResponse {
    /// The request that produced this response
    pub fn request(&self) -> &Arc<dyn HttpRequest> {
        &self.request
    }

    /// URL the transport ended up at (after any client-side redirects)
    pub fn final_url(&self) -> &str {
        &self.final_url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Content-Type header value, if present and valid UTF-8
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// A failed fetch, returned in place of a response
#[derive(Debug)]
pub struct FetchFailure {
    request: Arc<dyn HttpRequest>,
    error: FetchError,
    failed_at: DateTime<Utc>,
}

impl FetchFailure {
    pub fn new(request: Arc<dyn HttpRequest>, error: FetchError) -> Self {
        Self {
            request,
            error,
            failed_at: Utc::now(),
        }
    }

    /// The request that failed
    pub fn request(&self) -> &Arc<dyn HttpRequest> {
        &self.request
    }

    /// What went wrong
    pub fn error(&self) -> &FetchError {
        &self.error
    }

    pub fn into_error(self) -> FetchError {
        self.error
    }

    pub fn failed_at(&self) -> DateTime<Utc> {
        self.failed_at
    }
}

/// Outcome of fetching one request
#[derive(Debug)]
pub enum FetchResult {
    /// The transport returned a response and its body was read
    Success(HttpResponse),

    /// The fetch failed; the batch carried on
    Failure(FetchFailure),
}

impl FetchResult {
    /// Builds a failure result for `request`
    pub fn failure(request: Arc<dyn HttpRequest>, error: FetchError) -> Self {
        Self::Failure(FetchFailure::new(request, error))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The request this result belongs to, whatever the outcome
    ///
    /// This is the request handed to the fetcher, before any middleware
    /// rewrote it. The URL actually fetched is [`HttpResponse::final_url`].
    pub fn request(&self) -> &Arc<dyn HttpRequest> {
        match self {
            Self::Success(response) => response.request(),
            Self::Failure(failure) => failure.request(),
        }
    }

    pub fn url(&self) -> &str {
        self.request().url()
    }

    pub fn as_response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Success(response) => Some(response),
            Self::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Converts into a standard `Result`
    pub fn into_result(self) -> Result<HttpResponse, FetchFailure> {
        match self {
            Self::Success(response) => Ok(response),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl From<FetchFailure> for FetchResult {
    fn from(failure: FetchFailure) -> Self {
        Self::Failure(failure)
    }
}

impl From<HttpResponse> for FetchResult {
    fn from(response: HttpResponse) -> Self {
        Self::Success(response)
    }
}

/// Wraps the outcome of a transport call into a [`FetchResult`]
///
/// The raw response's body has already been read by the transport; it moves
/// into the response together with the status line and headers. Errors become
/// a failure bound to the original request.
pub fn adapt_response(
    request: Arc<dyn HttpRequest>,
    raw: Result<RawResponse, FetchError>,
) -> FetchResult {
    match raw {
        Ok(raw) => FetchResult::Success(HttpResponse {
            request,
            final_url: raw.url,
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
            fetched_at: Utc::now(),
        }),
        Err(error) => FetchResult::failure(request, error),
    }
}
