//! One-at-a-time fetching

use super::FetcherOptions;
use crate::config::Config;
use crate::middleware::MiddlewareChain;
use crate::request::{adapt_request, HttpRequest, IntoHttpRequest};
use crate::response::{adapt_response, FetchResult};
use crate::transport::{ReqwestTransport, Transport};
use crate::FetchError;
use std::sync::Arc;
use std::time::Duration;

/// Fetches requests in order on the calling task
#[derive(Clone)]
pub struct SequentialFetcher {
    transport: Arc<dyn Transport>,
    middlewares: MiddlewareChain,
    timeout: Duration,
}

impl SequentialFetcher {
    /// Creates a fetcher over `transport`
    ///
    /// The adapter middleware is prepended to `options.middlewares`.
    pub fn new(options: FetcherOptions, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            middlewares: MiddlewareChain::new(options.middlewares),
            timeout: options.timeout,
        }
    }

    /// Creates a fetcher backed by reqwest, as described by `config`
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let options = FetcherOptions::from_config(config)?;
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::new(options, Arc::new(transport)))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn middlewares(&self) -> &MiddlewareChain {
        &self.middlewares
    }

    /// Fetches every request, in order
    ///
    /// The input is fully consumed. The result has one entry per request at
    /// the same position; failures are returned as
    /// [`FetchResult::Failure`] and do not stop the batch.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sumi_fetch::config::Config;
    /// use sumi_fetch::fetcher::SequentialFetcher;
    ///
    /// # async fn example() -> sumi_fetch::Result<()> {
    /// let fetcher = SequentialFetcher::from_config(&Config::default())?;
    /// let results = fetcher
    ///     .get(vec!["https://example.com/", "https://example.org/"])
    ///     .await;
    ///
    /// for result in &results {
    ///     println!("{} -> success: {}", result.url(), result.is_success());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<I>(&self, requests: I) -> Vec<FetchResult>
    where
        I: IntoIterator,
        I::Item: IntoHttpRequest,
    {
        let requests = requests.into_iter();
        let mut results = Vec::with_capacity(requests.size_hint().0);

        for request in requests {
            results.push(self.fetch(adapt_request(request)).await);
        }

        tracing::debug!("Sequential batch finished: {} results", results.len());
        results
    }

    /// Like [`get`](Self::get), for inputs that can fail while being produced
    ///
    /// The first `Err` from the input aborts the batch and is returned as is.
    /// Errors from fetching individual requests are still reported per request.
    pub async fn try_get<I, R, E>(&self, requests: I) -> Result<Vec<FetchResult>, E>
    where
        I: IntoIterator<Item = Result<R, E>>,
        R: IntoHttpRequest,
    {
        let requests = requests.into_iter();
        let mut results = Vec::with_capacity(requests.size_hint().0);

        for request in requests {
            results.push(self.fetch(adapt_request(request?)).await);
        }

        Ok(results)
    }

    /// Fetches a single, already adapted request
    ///
    /// # Request Flow
    ///
    /// 1. Run the request hooks of every middleware
    ///    - A rejection becomes a failure, the network is not touched
    /// 2. Open the request on the transport, bounded by the timeout
    /// 3. Wrap the outcome into a [`FetchResult`]
    /// 4. Run the response hooks of every middleware
    ///
    /// The result always carries the caller's `request`, not the one the
    /// middlewares produced. Failures are logged at error level.
    pub async fn fetch(&self, request: Arc<dyn HttpRequest>) -> FetchResult {
        let result = match self.middlewares.process_request(Arc::clone(&request)) {
            Ok(prepared) => {
                tracing::debug!("Fetching {}", prepared.url());
                let raw = self.open(prepared.as_ref()).await;
                adapt_response(request, raw)
            }
            Err(error) => FetchResult::failure(request, error),
        };

        let result = self.middlewares.process_response(result);

        if let FetchResult::Failure(failure) = &result {
            tracing::error!("Fetch failed for {}: {}", failure.request().url(), failure.error());
        }

        result
    }

    /// Calls the transport, turning an elapsed timeout into an error value
    async fn open(
        &self,
        request: &dyn HttpRequest,
    ) -> Result<crate::transport::RawResponse, FetchError> {
        match tokio::time::timeout(self.timeout, self.transport.open(request, self.timeout)).await
        {
            Ok(raw) => raw,
            Err(_) => Err(FetchError::Timeout {
                url: request.url().to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

impl std::fmt::Debug for SequentialFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialFetcher")
            .field("middlewares", &self.middlewares.names())
            .field("timeout", &self.timeout)
            .finish()
    }
}
