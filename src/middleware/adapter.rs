use super::Middleware;
use crate::request::HttpRequest;
use crate::FetchError;
use std::sync::Arc;
use url::Url;

/// First middleware of every chain
///
/// Requests reach it already lifted to [`HttpRequest`] by
/// [`adapt_request`](crate::request::adapt_request). It checks that what came
/// out of the adaptation is something the transport can open: an absolute
/// `http` or `https` URL. Results pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterMiddleware;

impl Middleware for AdapterMiddleware {
    fn name(&self) -> &str {
        "adapter"
    }

    fn process_request(
        &self,
        request: Arc<dyn HttpRequest>,
    ) -> Result<Arc<dyn HttpRequest>, FetchError> {
        let url = Url::parse(request.url()).map_err(|e| FetchError::InvalidUrl {
            url: request.url().to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(request),
            other => Err(FetchError::InvalidUrl {
                url: request.url().to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}
