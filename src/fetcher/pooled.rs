//! Fetching on a worker pool

use super::pool::WorkerPool;
use super::{FetcherOptions, SequentialFetcher};
use crate::config::Config;
use crate::request::{adapt_request, HttpRequest, IntoHttpRequest};
use crate::response::FetchResult;
use crate::transport::{ReqwestTransport, Transport};
use crate::FetchError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Fetches requests concurrently on a fixed-size worker pool
///
/// Each request goes through exactly the same steps as with
/// [`SequentialFetcher::fetch`]; only the scheduling differs. Results are
/// returned in input order whatever order the workers finish in. The pool is
/// created with the fetcher and reused by every call.
#[derive(Debug)]
pub struct PooledFetcher {
    fetcher: Arc<SequentialFetcher>,
    pool: WorkerPool,
}

impl PooledFetcher {
    /// Creates a pooled fetcher over `transport`
    ///
    /// Must be called from within a Tokio runtime, which hosts the workers.
    ///
    /// # Returns
    ///
    /// * `Ok(PooledFetcher)` - Workers are up
    /// * `Err(SumiError::InvalidPoolSize)` - `options.pool_size` is zero or above [`MAX_POOL_SIZE`](crate::config::MAX_POOL_SIZE)
    /// * `Err(SumiError::NoRuntime)` - No Tokio runtime is running
    pub fn new(options: FetcherOptions, transport: Arc<dyn Transport>) -> crate::Result<Self> {
        let pool = WorkerPool::new(options.pool_size)?;
        let fetcher = Arc::new(SequentialFetcher::new(options, transport));
        Ok(Self { fetcher, pool })
    }

    /// Creates a pooled fetcher backed by reqwest, as described by `config`
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let options = FetcherOptions::from_config(config)?;
        let transport = ReqwestTransport::from_config(config)?;
        Self::new(options, Arc::new(transport))
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    pub fn timeout(&self) -> Duration {
        self.fetcher.timeout()
    }

    /// The per-request fetcher the workers run
    pub fn fetcher(&self) -> &SequentialFetcher {
        &self.fetcher
    }

    /// Fetches every request on the pool
    ///
    /// Blocks until every dispatched request has a result. The output has
    /// one entry per input request, at the same position.
    pub async fn get<I>(&self, requests: I) -> Vec<FetchResult>
    where
        I: IntoIterator,
        I::Item: IntoHttpRequest,
    {
        let mut batch = Batch::new();
        for request in requests {
            self.dispatch(&mut batch, adapt_request(request)).await;
        }
        batch.collect().await
    }

    /// Like [`get`](Self::get), for inputs that can fail while being produced
    ///
    /// The first `Err` from the input is returned as is. Requests already
    /// handed to the pool still run, but their results are discarded.
    pub async fn try_get<I, R, E>(&self, requests: I) -> Result<Vec<FetchResult>, E>
    where
        I: IntoIterator<Item = Result<R, E>>,
        R: IntoHttpRequest,
    {
        let mut batch = Batch::new();
        for request in requests {
            self.dispatch(&mut batch, adapt_request(request?)).await;
        }
        Ok(batch.collect().await)
    }

    /// Queues one request, recording its position in the batch
    async fn dispatch(&self, batch: &mut Batch, request: Arc<dyn HttpRequest>) {
        let index = batch.requests.len();
        batch.requests.push(Arc::clone(&request));

        let fetcher = Arc::clone(&self.fetcher);
        let results = batch.sender.clone();
        let job = async move {
            let result = fetcher.fetch(request).await;
            // The receiver is gone only if the batch was abandoned
            let _ = results.send((index, result));
        };

        if self.pool.submit(job).await.is_err() {
            tracing::error!("Worker pool closed, request {} not dispatched", index);
        }
    }

    /// Stops the workers after they finish queued work
    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }
}

/// Bookkeeping for one `get` call
struct Batch {
    requests: Vec<Arc<dyn HttpRequest>>,
    sender: mpsc::UnboundedSender<(usize, FetchResult)>,
    receiver: mpsc::UnboundedReceiver<(usize, FetchResult)>,
}

impl Batch {
    fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            requests: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Waits for every job and orders results by input position
    ///
    /// A job that never reports (its worker died, or the pool was closed)
    /// leaves a [`FetchError::WorkerLost`] failure in its slot.
    async fn collect(self) -> Vec<FetchResult> {
        let Batch {
            requests,
            sender,
            mut receiver,
        } = self;
        // Only job-held senders remain, so the channel closes once all jobs are done
        drop(sender);

        let mut slots: Vec<Option<FetchResult>> = requests.iter().map(|_| None).collect();
        while let Some((index, result)) = receiver.recv().await {
            slots[index] = Some(result);
        }

        let results: Vec<FetchResult> = slots
            .into_iter()
            .zip(requests)
            .map(|(slot, request)| {
                slot.unwrap_or_else(|| {
                    let error = FetchError::WorkerLost {
                        url: request.url().to_string(),
                    };
                    tracing::error!("Fetch failed for {}: {}", request.url(), error);
                    FetchResult::failure(request, error)
                })
            })
            .collect();

        tracing::debug!("Pooled batch finished: {} results", results.len());
        results
    }
}
