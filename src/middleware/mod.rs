//! Middleware hooks around each fetch
//!
//! A middleware sees every request before it reaches the transport and every
//! result after it comes back. Middlewares run in a fixed order, with the
//! [`AdapterMiddleware`] always first, each receiving the previous one's output.

mod adapter;
mod headers;

pub use adapter::AdapterMiddleware;
pub use headers::DefaultHeadersMiddleware;

use crate::request::HttpRequest;
use crate::response::FetchResult;
use crate::FetchError;
use std::fmt;
use std::sync::Arc;

/// Pre/post-processing hook around a single fetch
///
/// Middlewares are shared between workers and must not block.
pub trait Middleware: fmt::Debug + Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Transforms or rejects a request before it is fetched
    ///
    /// Returning an error turns this request into a failure without touching
    /// the network. Other requests in the batch are unaffected.
    fn process_request(
        &self,
        request: Arc<dyn HttpRequest>,
    ) -> Result<Arc<dyn HttpRequest>, FetchError> {
        Ok(request)
    }

    /// Transforms a result after the fetch
    fn process_response(&self, result: FetchResult) -> FetchResult {
        result
    }
}

/// Ordered list of middlewares, adapter first
#[derive(Debug, Clone)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Builds a chain with the adapter prepended to `middlewares`
    pub fn new(middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        let mut chain: Vec<Arc<dyn Middleware>> = Vec::with_capacity(middlewares.len() + 1);
        chain.push(Arc::new(AdapterMiddleware));
        chain.extend(middlewares);
        Self { middlewares: chain }
    }

    /// Runs every request hook in order, stopping at the first rejection
    pub fn process_request(
        &self,
        request: Arc<dyn HttpRequest>,
    ) -> Result<Arc<dyn HttpRequest>, FetchError> {
        self.middlewares
            .iter()
            .try_fold(request, |request, middleware| {
                middleware.process_request(request)
            })
    }

    /// Runs every response hook in order
    pub fn process_response(&self, result: FetchResult) -> FetchResult {
        self.middlewares
            .iter()
            .fold(result, |result, middleware| middleware.process_response(result))
    }

    /// Names of the middlewares in application order
    pub fn names(&self) -> Vec<&str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Always false: the adapter is always present
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
