//! Statistics over a batch of fetch results
//!
//! This module summarizes what a `get` call returned and prints the summary.

use crate::response::FetchResult;
use crate::FailureKind;
use std::collections::BTreeMap;

/// Batch statistics summary
#[derive(Debug, Clone, Default)]
pub struct FetchStatistics {
    /// Number of results in the batch
    pub total: u64,

    /// Results that carry a response
    pub succeeded: u64,

    /// Results that carry a failure
    pub failed: u64,

    /// Sum of response body sizes
    pub bytes_received: u64,

    /// Count of responses by status code
    pub status_codes: BTreeMap<u16, u64>,

    /// Count of failures by kind
    pub failures_by_kind: BTreeMap<FailureKind, u64>,
}

impl FetchStatistics {
    /// Builds statistics from a batch of results
    pub fn from_results(results: &[FetchResult]) -> Self {
        let mut stats = Self::default();

        for result in results {
            stats.total += 1;
            match result {
                FetchResult::Success(response) => {
                    stats.succeeded += 1;
                    stats.bytes_received += response.body().len() as u64;
                    *stats.status_codes.entry(response.status()).or_insert(0) += 1;
                }
                FetchResult::Failure(failure) => {
                    stats.failed += 1;
                    *stats
                        .failures_by_kind
                        .entry(failure.error().kind())
                        .or_insert(0) += 1;
                }
            }
        }

        stats
    }

    /// Share of successful results, in percent
    pub fn success_rate(&self) -> f64 {
        if self.total > 0 {
            (self.succeeded as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &FetchStatistics) {
    println!("=== Fetch Statistics ===\n");

    println!("Overview:");
    println!("  Requests: {}", stats.total);
    println!("  Succeeded: {}", stats.succeeded);
    println!("  Failed: {}", stats.failed);
    println!("  Bytes received: {}", stats.bytes_received);
    println!();

    if !stats.status_codes.is_empty() {
        println!("Responses by Status:");
        for (status, count) in &stats.status_codes {
            println!("  {}: {}", status, count);
        }
        println!();
    }

    if !stats.failures_by_kind.is_empty() {
        println!("Failure Summary:");
        // Sort kinds by count (descending)
        let mut failure_counts: Vec<_> = stats.failures_by_kind.iter().collect();
        failure_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in failure_counts {
            let percentage = (*count as f64 / stats.total as f64) * 100.0;
            println!("  {:?}: {} ({:.1}%)", kind, count, percentage);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} requests)",
        stats.success_rate(),
        stats.succeeded,
        stats.total
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::adapt_request;
    use crate::response::adapt_response;
    use crate::transport::RawResponse;
    use crate::FetchError;
    use reqwest::header::HeaderMap;
    use std::time::Duration;

    fn success(url: &'static str, status: u16, body: &str) -> FetchResult {
        adapt_response(
            adapt_request(url),
            Ok(RawResponse {
                url: url.to_string(),
                status,
                headers: HeaderMap::new(),
                body: body.as_bytes().to_vec(),
            }),
        )
    }

    fn timeout(url: &'static str) -> FetchResult {
        adapt_response(
            adapt_request(url),
            Err(FetchError::Timeout {
                url: url.to_string(),
                timeout: Duration::from_secs(5),
            }),
        )
    }

    #[test]
    fn test_statistics_from_results() {
        let results = vec![
            success("https://example.com/a", 200, "hello"),
            timeout("https://example.com/b"),
            success("https://example.com/c", 200, "world!"),
            success("https://example.com/d", 204, ""),
        ];

        let stats = FetchStatistics::from_results(&results);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.succeeded, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.bytes_received, 11);
        assert_eq!(stats.status_codes.get(&200), Some(&2));
        assert_eq!(stats.status_codes.get(&204), Some(&1));
        assert_eq!(stats.failures_by_kind.get(&FailureKind::Timeout), Some(&1));
        assert_eq!(stats.success_rate(), 75.0);
    }

    #[test]
    fn test_empty_batch() {
        let stats = FetchStatistics::from_results(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.success_rate(), 0.0);
    }
}
