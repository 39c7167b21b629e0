//! Output module for reporting fetch results
//!
//! This module handles:
//! - One-line summaries of individual results
//! - Batch statistics

pub mod stats;

pub use stats::{print_statistics, FetchStatistics};

use crate::response::FetchResult;

/// Formats a single result as one line of text
///
/// Successes show the status code and body size, failures the error.
///
/// # Example
///
/// ```
/// use sumi_fetch::output::format_result;
/// use sumi_fetch::request::{adapt_request, HttpRequest};
/// use sumi_fetch::response::FetchResult;
/// use sumi_fetch::FetchError;
///
/// let request = adapt_request("https://example.com/");
/// let error = FetchError::Status { url: request.url().to_string(), status: 404 };
/// let line = format_result(&FetchResult::failure(request, error));
/// assert!(line.starts_with("FAIL"));
/// ```
pub fn format_result(result: &FetchResult) -> String {
    match result {
        FetchResult::Success(response) => format!(
            "OK   {} {} ({} bytes)",
            response.status(),
            response.request().url(),
            response.body().len()
        ),
        FetchResult::Failure(failure) => format!(
            "FAIL {} [{:?}] {}",
            failure.request().url(),
            failure.error().kind(),
            failure.error()
        ),
    }
}
