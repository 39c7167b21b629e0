//! Fetchers
//!
//! This module contains the two execution strategies:
//! - [`SequentialFetcher`] fetches requests one after another
//! - [`PooledFetcher`] runs the same per-request work on a [`WorkerPool`]
//!
//! Both return exactly one [`FetchResult`](crate::response::FetchResult) per
//! input request, in input order. A failed request never aborts the batch.

mod pool;
mod pooled;
mod sequential;

pub use pool::{PoolClosed, WorkerPool};
pub use pooled::PooledFetcher;
pub use sequential::SequentialFetcher;

use crate::config::{validate, Config};
use crate::middleware::{DefaultHeadersMiddleware, Middleware};
use crate::ConfigError;
use std::sync::Arc;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of pool workers
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Construction options shared by both fetchers
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    /// Upper bound for each network call
    pub timeout: Duration,

    /// Number of workers (ignored by the sequential fetcher)
    pub pool_size: usize,

    /// Middlewares run after the adapter, in this order
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            pool_size: DEFAULT_POOL_SIZE,
            middlewares: Vec::new(),
        }
    }
}

impl FetcherOptions {
    /// Derives options from a configuration
    ///
    /// The configuration is validated first, so a `Config` built in code gets
    /// the same checks as one loaded from a file. A non-empty `[headers]`
    /// table installs a [`DefaultHeadersMiddleware`].
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        validate(config)?;

        let mut middlewares: Vec<Arc<dyn Middleware>> = Vec::new();
        if !config.headers.is_empty() {
            middlewares.push(Arc::new(DefaultHeadersMiddleware::from_config(
                &config.headers,
            )?));
        }

        Ok(Self {
            timeout: config.fetcher.timeout_duration()?,
            pool_size: config.fetcher.pool_size,
            middlewares,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Appends a middleware after the ones already configured
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }
}
